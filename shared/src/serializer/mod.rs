mod aggregate;
mod payload_header;
mod update_message;

pub use aggregate::{deserialize_all, serialize_all, SerializeCounts, SyncScope};
pub use payload_header::PayloadHeader;
pub use update_message::UpdateMessage;
