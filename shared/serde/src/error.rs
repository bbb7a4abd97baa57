use thiserror::Error;

/// Errors produced while packing or unpacking bits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Attempted to read past the declared end of the stream
    #[error("Attempted to read {requested} bits with only {remaining} bits remaining")]
    EndOfStream { requested: u32, remaining: u32 },

    /// Value cannot be represented by the configured packer
    #[error("Value {value} is outside of the encodable range [{min}, {max}]")]
    OutOfRange { value: i128, min: i128, max: i128 },

    /// A serialized string did not contain valid UTF-8
    #[error("Serialized string is not valid UTF-8")]
    InvalidUtf8,
}
