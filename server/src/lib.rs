//! # Replica Server
//! Authoritative side of the replica replication engine: flushes the dirty
//! state units of every object into owner & observer payloads each tick, and
//! keeps track of which connections observe which objects.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use replica_shared::{
        BitReader, BitWrite, BitWriter, ConnectionId, ConnectionView, DirtyMask, ObjectId,
        PayloadHeader, Recipient, ReplicationError, Serde, SerdeErr, StateUnit, SyncMode,
        SyncVar, UnitError, UnitIndex,
    };
}

mod connection;
mod events;
mod object;
mod server;

pub use connection::ConnectionRegistry;
pub use events::{
    ErrorEvent, ReplicationEvent, ReplicationEvents, VisibilityGainedEvent, VisibilityLostEvent,
};
pub use object::{check_observer, rebuild_observers, ObserverState, RebuildOutcome, ReplicatedObject};
pub use server::{ReplicationServer, ServerConfig};
