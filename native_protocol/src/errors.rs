use thiserror::Error;

/// Enum representing errors that can occur within the native protocol.
#[derive(Debug, Error, PartialEq)]
pub enum NativeError {
    #[error("Serialization error occurred: {0}")]
    SerializationError(String),
    #[error("Not enough bytes for a complete frame")]
    NotEnoughBytes,
    #[error("Unexpected bytes after a complete frame")]
    TrailingBytes,
    #[error("Invalid frame type marker {0:#04x}")]
    InvalidType(u8),
    #[error("Invalid length: {0}")]
    InvalidLength(String),
    #[error("Invalid integer: {0}")]
    InvalidInteger(String),
    #[error("Bulk string is not terminated by CRLF")]
    MissingTerminator,
    #[error("Frame text is not valid UTF-8")]
    InvalidUtf8,
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}
