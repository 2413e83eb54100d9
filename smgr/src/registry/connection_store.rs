//! Connection Store (§4.1): indexed container of [`Connection`] records
//! with connectionId↔sessionId lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::session::Connection;

#[derive(Default)]
pub struct ConnectionStore {
    connections: Mutex<HashMap<u32, Arc<Connection>>>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, session_id: u32, auth_token: String, permissions: u32) -> Arc<Connection> {
        let conn = Arc::new(Connection::new(session_id, auth_token, permissions));
        self.connections.lock().unwrap().insert(conn.id, conn.clone());
        conn
    }

    pub fn get(&self, id: u32) -> Option<Arc<Connection>> {
        self.connections.lock().unwrap().get(&id).cloned()
    }

    /// Absent is a no-op, per §4.1's operations table.
    pub fn remove(&self, id: u32) {
        self.connections.lock().unwrap().remove(&id);
    }

    /// Snapshot enumeration: lock, clone the list, release.
    pub fn enumerate(&self) -> Vec<Arc<Connection>> {
        self.connections.lock().unwrap().values().cloned().collect()
    }

    /// Returns the bound connection id for `session_id`, or 0 if none is
    /// bound — per §3's `getConnectionIdForSessionId`.
    pub fn get_connection_id_for_session_id(&self, session_id: u32) -> u32 {
        self.connections
            .lock()
            .unwrap()
            .values()
            .find(|c| c.session_id() == session_id)
            .map(|c| c.id)
            .unwrap_or(0)
    }

    pub fn find_by_auth_token(&self, token: &str) -> Option<Arc<Connection>> {
        self.connections
            .lock()
            .unwrap()
            .values()
            .find(|c| c.auth_token == token)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let store = ConnectionStore::new();
        let conn = store.create(5, "tok".into(), 0);
        assert!(store.get(conn.id).is_some());
    }

    #[test]
    fn get_missing_is_none_not_error() {
        let store = ConnectionStore::new();
        assert!(store.get(999).is_none());
    }

    #[test]
    fn remove_missing_is_a_no_op() {
        let store = ConnectionStore::new();
        store.remove(999);
    }

    #[test]
    fn connection_id_for_session_id_is_zero_when_unbound() {
        let store = ConnectionStore::new();
        assert_eq!(store.get_connection_id_for_session_id(42), 0);
        let conn = store.create(42, "tok".into(), 0);
        assert_eq!(store.get_connection_id_for_session_id(42), conn.id);
    }

    #[test]
    fn enumerate_returns_snapshot() {
        let store = ConnectionStore::new();
        store.create(1, "a".into(), 0);
        store.create(2, "b".into(), 0);
        assert_eq!(store.enumerate().len(), 2);
    }
}
