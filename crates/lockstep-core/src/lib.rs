//! Lockstep Core
//!
//! Core types and encoding for the Lockstep relay protocol.
//!
//! This crate provides:
//! - Wire message types ([`Message`], [`PlaybackState`])
//! - JSON encoding/decoding ([`codec`])
//! - Shared error types ([`Error`])

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{decode, encode};
pub use error::{Error, Result};
pub use types::{Message, PlaybackState};

/// Default WebSocket port
pub const DEFAULT_WS_PORT: u16 = 3000;
