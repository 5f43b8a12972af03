//! Error types for Lockstep

use thiserror::Error;

/// Result type alias for Lockstep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lockstep protocol error types
#[derive(Error, Debug)]
pub enum Error {
    /// Payload is not valid JSON, or a control message is missing fields
    #[error("decode error: {0}")]
    Decode(String),

    /// Message failed to serialize
    #[error("encode error: {0}")]
    Encode(String),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),
}
