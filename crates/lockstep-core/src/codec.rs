//! Lockstep JSON codec
//!
//! Messages travel as self-describing JSON, discriminated by a `type`
//! field. Decoding only gives `ready` a schema; any other value (other
//! `type`, absent `type`, non-object JSON) is classified as generic and
//! held untouched for pass-through re-encoding. An inbound `sync` is not
//! special: it relays like any generic message.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{Message, PlaybackState};

/// Wire values of the `type` discriminator
pub mod msg {
    pub const READY: &str = "ready";
    pub const SYNC: &str = "sync";
}

/// Playback state with its `type` tag, as it appears on the wire
#[derive(Serialize)]
struct TaggedState<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    state: &'a PlaybackState,
}

/// Decode a message from raw JSON bytes
pub fn decode(data: &[u8]) -> Result<Message> {
    let value: Value =
        serde_json::from_slice(data).map_err(|e| Error::Decode(e.to_string()))?;

    if value.get("type").and_then(Value::as_str) == Some(msg::READY) {
        let state: PlaybackState =
            serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))?;
        return Ok(Message::Ready(state));
    }

    Ok(Message::Generic(value))
}

/// Encode a message to JSON bytes
pub fn encode(message: &Message) -> Result<Bytes> {
    let data = match message {
        Message::Ready(state) => to_vec(&TaggedState {
            kind: msg::READY,
            state,
        })?,
        Message::Sync(state) => to_vec(&TaggedState {
            kind: msg::SYNC,
            state,
        })?,
        Message::Generic(value) => to_vec(value)?,
    };
    Ok(Bytes::from(data))
}

fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))
}
