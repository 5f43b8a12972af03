//! Relay error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] lockstep_transport::TransportError),

    #[error("core protocol error: {0}")]
    Core(#[from] lockstep_core::Error),
}
