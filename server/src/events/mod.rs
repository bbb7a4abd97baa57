mod replication_events;

pub use replication_events::{
    ErrorEvent, ReplicationEvent, ReplicationEvents, VisibilityGainedEvent, VisibilityLostEvent,
};
