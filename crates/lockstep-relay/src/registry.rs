//! Live connection registry

use dashmap::DashMap;
use std::sync::Arc;

use crate::session::{Session, SessionId};

/// The authoritative set of live sessions
///
/// Membership is driven entirely by the transport layer: a session is
/// added when its connection is accepted and removed when the transport
/// reports it closed. Routing never mutates the registry; it iterates
/// [`snapshot`](Registry::snapshot) copies, so removal is safe while a
/// route is in flight.
pub struct Registry {
    sessions: DashMap<SessionId, Arc<Session>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Track a newly accepted session
    pub fn add(&self, session: Arc<Session>) {
        self.sessions.insert(session.id.clone(), session);
    }

    /// Stop tracking a session; no-op if it is already gone
    pub fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    /// Point-in-time view of the current members, safe to iterate while
    /// the registry is concurrently mutated
    ///
    /// Order is arbitrary.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
