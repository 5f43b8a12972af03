//! Shared test doubles for relay tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use lockstep_relay::Session;
use lockstep_transport::{Result, TransportError, TransportSender};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory sender that records everything routed to it
pub struct MockSender {
    sent: Mutex<Vec<Bytes>>,
    open: AtomicBool,
    failing: AtomicBool,
}

impl MockSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
            failing: AtomicBool::new(false),
        })
    }

    /// Payloads received so far, parsed as JSON
    pub fn received(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|data| serde_json::from_slice(data).unwrap())
            .collect()
    }

    pub fn received_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Simulate the transport reporting this connection closed
    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    /// Make every send fail while the connection still reports open
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransportSender for MockSender {
    async fn send(&self, data: Bytes) -> Result<()> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("mock send failure".to_string()));
        }
        self.sent.lock().unwrap().push(data);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Build a session backed by a mock sender
pub fn mock_session(sender: &Arc<MockSender>) -> Arc<Session> {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    Arc::new(Session::new(sender.clone(), addr))
}
