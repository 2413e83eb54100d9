//! Session Store (§4.1): exclusively owns [`Session`] records. Every other
//! holder resolves through `sessionId` and treats lookup-miss as
//! recoverable (§9's arena-style ownership).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::session::Session;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<u32, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new `Session` (with its executor thread) and registers it.
    pub fn create(&self) -> Arc<Session> {
        let session = Session::new();
        self.sessions.lock().unwrap().insert(session.id, session.clone());
        session
    }

    pub fn get_session(&self, id: u32) -> Option<Arc<Session>> {
        self.sessions.lock().unwrap().get(&id).cloned()
    }

    /// Removable only after the caller has stopped the session's
    /// executor and its backend, per §3's lifecycle rule — this store
    /// does not enforce that itself; callers (task::shutdown/logoff) are
    /// responsible for the ordering.
    pub fn remove(&self, id: u32) {
        self.sessions.lock().unwrap().remove(&id);
    }

    pub fn get_all_sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.lock().unwrap().values().cloned().collect()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.sessions.lock().unwrap().contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_registers_and_get_session_finds_it() {
        let store = SessionStore::new();
        let session = store.create();
        assert!(store.get_session(session.id).is_some());
        session.executor.stop(false);
    }

    #[test]
    fn get_missing_session_is_none() {
        let store = SessionStore::new();
        assert!(store.get_session(12345).is_none());
    }

    #[test]
    fn remove_then_get_is_none() {
        let store = SessionStore::new();
        let session = store.create();
        let id = session.id;
        session.executor.stop(false);
        store.remove(id);
        assert!(store.get_session(id).is_none());
    }

    #[test]
    fn get_all_sessions_is_a_snapshot() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_eq!(store.get_all_sessions().len(), 2);
        a.executor.stop(false);
        b.executor.stop(false);
    }
}
