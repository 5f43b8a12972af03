//! Common test helpers and utilities for Lockstep tests
//!
//! This crate provides:
//! - Condition-based waiting (no hardcoded sleeps)
//! - An RAII test relay with proper cleanup
//! - A raw JSON client over the WebSocket transport

use bytes::Bytes;
use lockstep_relay::{Relay, RelayConfig};
use lockstep_transport::websocket::{WebSocketReceiver, WebSocketSender};
use lockstep_transport::{
    Transport, TransportEvent, TransportReceiver, TransportSender, WebSocketTransport,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Port Allocation
// ============================================================================

/// Find an available TCP port for testing
pub async fn find_available_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F, Fut>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Wait for the relay's session count to reach a target value
pub async fn wait_for_session_count(relay: &Relay, target: usize, max_wait: Duration) -> bool {
    wait_for(
        || async { relay.session_count() == target },
        DEFAULT_CHECK_INTERVAL,
        max_wait,
    )
    .await
}

// ============================================================================
// Test Relay - RAII wrapper with proper cleanup
// ============================================================================

/// A test relay that automatically cleans up on drop
pub struct TestRelay {
    port: u16,
    relay: Arc<Relay>,
    handle: Option<tokio::task::JoinHandle<()>>,
    ready: Arc<AtomicBool>,
}

impl TestRelay {
    /// Start a test relay with default configuration
    pub async fn start() -> Self {
        Self::start_with_config(RelayConfig {
            name: "Test Relay".to_string(),
            ..Default::default()
        })
        .await
    }

    /// Start a test relay with custom configuration
    pub async fn start_with_config(config: RelayConfig) -> Self {
        let port = find_available_port().await;
        let addr = format!("127.0.0.1:{}", port);
        let ready = Arc::new(AtomicBool::new(false));
        let ready_clone = ready.clone();

        let relay = Arc::new(Relay::new(config));
        let serve_relay = relay.clone();

        let handle = tokio::spawn(async move {
            ready_clone.store(true, Ordering::SeqCst);
            let _ = serve_relay.serve_websocket(&addr).await;
        });

        // Wait for the serve task to start, then for the port to listen
        let start = Instant::now();
        while !ready.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let _ = wait_for(
            || {
                let port = port;
                async move {
                    tokio::net::TcpStream::connect(format!("127.0.0.1:{}", port))
                        .await
                        .is_ok()
                }
            },
            Duration::from_millis(10),
            Duration::from_secs(5),
        )
        .await;

        Self {
            port,
            relay,
            handle: Some(handle),
            ready,
        }
    }

    /// Get the WebSocket URL for this relay
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Check if the relay serve task started
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// The relay under test
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Connect a raw JSON client to this relay
    pub async fn connect_client(&self) -> TestClient {
        TestClient::connect(&self.url()).await
    }

    /// Stop the relay explicitly (also happens on drop)
    pub fn stop(&mut self) {
        self.relay.stop();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Test Client - raw JSON over the WebSocket transport
// ============================================================================

/// A raw JSON client for exercising the relay from the outside
pub struct TestClient {
    sender: WebSocketSender,
    receiver: WebSocketReceiver,
}

impl TestClient {
    /// Connect to a relay URL
    pub async fn connect(url: &str) -> Self {
        let (sender, receiver) = WebSocketTransport::connect(url)
            .await
            .expect("test client connect failed");
        Self { sender, receiver }
    }

    /// Send a JSON value
    pub async fn send_json(&self, value: &Value) {
        let data = serde_json::to_vec(value).expect("serialize test payload");
        self.sender
            .send(Bytes::from(data))
            .await
            .expect("test client send failed");
    }

    /// Send raw bytes, bypassing JSON encoding
    pub async fn send_raw(&self, data: &[u8]) {
        self.sender
            .send(Bytes::copy_from_slice(data))
            .await
            .expect("test client send failed");
    }

    /// Receive the next data frame as JSON, or None if nothing arrives
    /// within `max_wait`
    pub async fn recv_json(&mut self, max_wait: Duration) -> Option<Value> {
        let deadline = Instant::now() + max_wait;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match timeout(remaining, self.receiver.recv()).await {
                Ok(Some(TransportEvent::Data(data))) => {
                    return serde_json::from_slice(&data).ok();
                }
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => return None,
            }
        }
    }

    /// True if no data frame arrives within `window`
    pub async fn is_silent(&mut self, window: Duration) -> bool {
        self.recv_json(window).await.is_none()
    }

    /// Check if the underlying transport reports the connection open
    pub fn is_connected(&self) -> bool {
        self.sender.is_connected()
    }

    /// Close the connection
    pub async fn close(&self) {
        let _ = self.sender.close().await;
    }
}
