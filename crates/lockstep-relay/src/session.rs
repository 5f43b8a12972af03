//! Session management

use bytes::Bytes;
use lockstep_core::Message;
use lockstep_transport::TransportSender;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Session identifier
pub type SessionId = String;

/// A connected client session
///
/// Identity is the session ID: no two sessions compare equal, even across
/// reconnects from the same address.
pub struct Session {
    /// Unique session ID
    pub id: SessionId,
    /// Remote address
    pub addr: SocketAddr,
    /// Transport sender for this session
    sender: Arc<dyn TransportSender>,
    /// Session creation time
    pub joined_at: Instant,
}

impl Session {
    /// Create a new session
    pub fn new(sender: Arc<dyn TransportSender>, addr: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            addr,
            sender,
            joined_at: Instant::now(),
        }
    }

    /// Send raw bytes to this session
    pub async fn send(&self, data: Bytes) -> Result<(), lockstep_transport::TransportError> {
        self.sender.send(data).await
    }

    /// Encode and send a relay message
    pub async fn send_message(&self, message: &Message) -> Result<(), lockstep_core::Error> {
        let data = lockstep_core::encode(message)?;
        self.send(data)
            .await
            .map_err(|e| lockstep_core::Error::Connection(e.to_string()))
    }

    /// Check if the transport still reports this session open
    pub fn is_connected(&self) -> bool {
        self.sender.is_connected()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .finish()
    }
}
