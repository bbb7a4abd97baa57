mod observers;
mod replicated_object;

pub use observers::{check_observer, rebuild_observers, ObserverState, RebuildOutcome};
pub use replicated_object::ReplicatedObject;
