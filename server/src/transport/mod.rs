mod payload_sender;

pub use payload_sender::PayloadSender;
