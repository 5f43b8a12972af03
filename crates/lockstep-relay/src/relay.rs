//! Main relay implementation
//!
//! The relay is transport-agnostic - it can accept connections from any
//! transport that implements the `TransportServer` trait. Each accepted
//! connection gets its own task that feeds inbound messages through
//! [`route`], so one client's messages are processed in arrival order
//! while different clients proceed independently.

use bytes::Bytes;
use lockstep_core::{codec, Message, PlaybackState};
use lockstep_transport::{
    TransportEvent, TransportReceiver, TransportSender, TransportServer, WebSocketConfig,
    WebSocketServer,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{error::Result, registry::Registry, session::Session};

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Server name
    pub name: String,
    /// Maximum inbound message size in bytes
    pub max_message_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: "Lockstep Relay".to_string(),
            max_message_size: 64 * 1024,
        }
    }
}

/// Lockstep relay
pub struct Relay {
    config: RelayConfig,
    /// Live sessions
    registry: Arc<Registry>,
    /// Running flag
    running: Arc<RwLock<bool>>,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new()),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Serve using any TransportServer implementation.
    ///
    /// This is the core method that transport-specific methods use
    /// internally.
    pub async fn serve_on<S>(&self, mut server: S) -> Result<()>
    where
        S: TransportServer + 'static,
        S::Sender: 'static,
        S::Receiver: 'static,
    {
        info!("{} accepting connections", self.config.name);
        *self.running.write() = true;

        while *self.running.read() {
            match server.accept().await {
                Ok((sender, receiver, addr)) => {
                    self.handle_connection(Arc::new(sender), receiver, addr);
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Start the relay on WebSocket
    pub async fn serve_websocket(&self, addr: &str) -> Result<()> {
        let server = WebSocketServer::bind(addr)
            .await?
            .with_config(WebSocketConfig {
                max_message_size: self.config.max_message_size,
            });
        self.serve_on(server).await
    }

    /// Alias for `serve_websocket`
    pub async fn serve(&self, addr: &str) -> Result<()> {
        self.serve_websocket(addr).await
    }

    /// Handle a new connection
    fn handle_connection(
        &self,
        sender: Arc<dyn TransportSender>,
        mut receiver: impl TransportReceiver + 'static,
        addr: SocketAddr,
    ) {
        let registry = Arc::clone(&self.registry);
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            let session = Arc::new(Session::new(sender, addr));
            registry.add(session.clone());
            info!("New client connected from {}. Total: {}", addr, registry.len());

            while *running.read() {
                match receiver.recv().await {
                    Some(TransportEvent::Data(data)) => {
                        route(&registry, &session, &data).await;
                    }
                    Some(TransportEvent::Disconnected { reason }) => {
                        debug!("Client {} disconnected: {:?}", addr, reason);
                        break;
                    }
                    Some(TransportEvent::Error(e)) => {
                        error!("Transport error from {}: {}", addr, e);
                        break;
                    }
                    Some(TransportEvent::Connected) => {}
                    None => break,
                }
            }

            registry.remove(&session.id);
            info!("Client disconnected from {}. Total: {}", addr, registry.len());
        });
    }

    /// Stop the relay
    pub fn stop(&self) {
        *self.running.write() = false;
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// Shared registry handle
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}

/// Route one inbound message from `origin` to its targets.
///
/// `ready` is answered with a `sync` reply sent to a single peer; every
/// other payload is relayed verbatim to all other open sessions. Decode
/// failures drop the message; send failures are local to their target and
/// never abort the rest of a fan-out.
pub async fn route(registry: &Registry, origin: &Session, data: &[u8]) {
    let message = match codec::decode(data) {
        Ok(message) => message,
        Err(e) => {
            warn!("Invalid message from {}: {}", origin.addr, e);
            return;
        }
    };

    match message {
        Message::Ready(state) => reply_sync(registry, origin, state).await,
        other => relay_to_peers(registry, origin, &other).await,
    }
}

/// Answer a `ready`: the first open peer in snapshot order receives the
/// `sync` reply, nobody else does. Snapshot order is arbitrary, so which
/// peer answers is unspecified; only that at most one does.
async fn reply_sync(registry: &Registry, origin: &Session, state: PlaybackState) {
    let reply = match codec::encode(&Message::Sync(state)) {
        Ok(reply) => reply,
        Err(e) => {
            error!("Failed to encode sync reply: {}", e);
            return;
        }
    };

    for peer in registry.snapshot() {
        if peer.id == origin.id || !peer.is_connected() {
            continue;
        }
        match peer.send(reply.clone()).await {
            Ok(()) => {
                debug!("Sync reply for {} sent to {}", origin.addr, peer.addr);
                return;
            }
            Err(e) => {
                // Keep scanning: at most one peer ever receives the reply
                warn!("Sync send to {} failed: {}", peer.addr, e);
            }
        }
    }

    debug!("No peer available to answer ready from {}", origin.addr);
}

/// Relay a message verbatim to every other open session
async fn relay_to_peers(registry: &Registry, origin: &Session, message: &Message) {
    let data: Bytes = match codec::encode(message) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to re-encode message from {}: {}", origin.addr, e);
            return;
        }
    };

    for peer in registry.snapshot() {
        if peer.id == origin.id || !peer.is_connected() {
            continue;
        }
        if let Err(e) = peer.send(data.clone()).await {
            warn!("Relay send to {} failed: {}", peer.addr, e);
        }
    }
}
