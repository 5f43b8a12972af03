//! Protocol types and message definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Playback position reported by a client that finished loading media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Identifier of the media being played
    pub hash: String,
    /// Playback position in seconds
    #[serde(rename = "currentTime")]
    pub current_time: f64,
    /// Whether playback is paused
    pub paused: bool,
}

/// A relay message
///
/// Only `ready` has a fixed schema on the way in; everything else is kept
/// as an opaque JSON value so it can be re-encoded without loss.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A client asks a single peer for the authoritative playback state
    Ready(PlaybackState),
    /// Reply to `Ready`, carrying the authoritative playback state
    Sync(PlaybackState),
    /// Any other payload, relayed verbatim to all other clients
    Generic(Value),
}

impl Message {
    /// Wire value of the `type` discriminator, if the message carries one
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Message::Ready(_) => Some(crate::codec::msg::READY),
            Message::Sync(_) => Some(crate::codec::msg::SYNC),
            Message::Generic(value) => value.get("type").and_then(Value::as_str),
        }
    }
}
