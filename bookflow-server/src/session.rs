//! Subscriber session registry.

use bookflow_transport::SessionObserver;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;

/// One connected subscriber.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID assigned by the transport.
    pub id: u64,
    /// Peer address.
    pub peer_addr: SocketAddr,
    /// Connection timestamp (nanos since epoch).
    pub connected_at: u64,
}

/// Tracks subscriber sessions as the transport reports them.
pub struct SessionManager {
    sessions: RwLock<HashMap<u64, Session>>,
}

impl SessionManager {
    /// Creates an empty session manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Gets a session by ID.
    #[must_use]
    pub fn get(&self, session_id: u64) -> Option<Session> {
        self.sessions.read().get(&session_id).cloned()
    }

    /// Returns the number of connected sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns all connected session IDs.
    #[must_use]
    pub fn session_ids(&self) -> Vec<u64> {
        self.sessions.read().keys().copied().collect()
    }

    /// Visits every connected session.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Session),
    {
        for session in self.sessions.read().values() {
            f(session);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for SessionManager {
    fn on_session_start(&self, session_id: u64, peer: SocketAddr) {
        let now = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .unsigned_abs();
        let session = Session {
            id: session_id,
            peer_addr: peer,
            connected_at: now,
        };
        self.sessions.write().insert(session_id, session);
        tracing::info!(session = session_id, %peer, "subscriber session started");
    }

    fn on_session_end(&self, session_id: u64) {
        if self.sessions.write().remove(&session_id).is_some() {
            tracing::info!(session = session_id, "subscriber session ended");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    #[test]
    fn test_sessions_tracked_through_observer() {
        let manager = SessionManager::new();

        manager.on_session_start(1, addr());
        manager.on_session_start(2, addr());
        assert_eq!(manager.count(), 2);

        let session = manager.get(1).unwrap();
        assert_eq!(session.id, 1);
        assert_eq!(session.peer_addr, addr());
        assert!(session.connected_at > 0);

        manager.on_session_end(1);
        assert_eq!(manager.count(), 1);
        assert!(manager.get(1).is_none());
    }

    #[test]
    fn test_end_of_unknown_session_ignored() {
        let manager = SessionManager::new();
        manager.on_session_end(42);
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_for_each_visits_all() {
        let manager = SessionManager::new();
        manager.on_session_start(1, addr());
        manager.on_session_start(2, addr());

        let mut seen = Vec::new();
        manager.for_each(|s| seen.push(s.id));
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);

        let mut ids = manager.session_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }
}
