//! Lockstep Transport Layer
//!
//! This crate provides the transport seams the relay is built against,
//! plus the WebSocket implementation used in production:
//! - Trait definitions for servers, senders and receivers
//! - WebSocket server and client over tokio-tungstenite

pub mod error;
pub mod traits;
pub mod websocket;

pub use error::{Result, TransportError};
pub use traits::{Transport, TransportEvent, TransportReceiver, TransportSender, TransportServer};
pub use websocket::{WebSocketConfig, WebSocketServer, WebSocketTransport};
