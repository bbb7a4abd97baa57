use std::default::Default;

/// Contains Config properties which will be used by the Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Whether a payload that fails to apply is logged as a warning, on top
    /// of being reported as an error event
    pub log_payload_errors: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_payload_errors: true,
        }
    }
}
