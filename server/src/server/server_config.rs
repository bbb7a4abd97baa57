use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// How often every object's observer set is rebuilt. `None` rebuilds
    /// only on spawn and when a rebuild is requested.
    pub observer_rebuild_interval: Option<Duration>,
    /// Whether changes of objects nobody observes are discarded. New
    /// observers always get a full sync, so nothing is lost by dropping them.
    pub clear_dirty_without_observers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            observer_rebuild_interval: None,
            clear_dirty_without_observers: true,
        }
    }
}
