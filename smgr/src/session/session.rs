//! Session record (§3). Owned exclusively by the Session Store; every other
//! holder resolves through a `sessionId` and treats lookup-miss as
//! recoverable (§9's arena-style ownership redesign).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::executor::Executor;

/// `WTS_CONNECTSTATE_CLASS` in the original — modeled as a closed enum so
/// invalid transitions are a compile-time-checked `match` rather than an
/// open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    Init,
    Connected,
    Active,
    Disconnected,
    Shadow,
    Down,
}

/// Snapshot of a session's mutable identity fields, guarded by one mutex
/// per §3's "every record carries its own internal exclusion".
#[derive(Debug, Clone)]
pub struct SessionFields {
    pub user_name: String,
    pub domain: String,
    pub auth_user_name: String,
    pub auth_domain: String,
    pub client_host_name: String,
    pub module_config_name: String,
    pub connect_state: ConnectState,
    pub connect_state_change_time: SystemTime,
    pub user_token: Option<String>,
    pub auth_backend: Option<String>,
    pub backend: Option<String>,
    pub sbp_compatible: bool,
    pub permissions: u32,
    /// The state to restore on `stopRemoteControl`, captured when
    /// entering `Shadow` (§4.4).
    pub pre_shadow_state: Option<ConnectState>,
}

impl Default for SessionFields {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            domain: String::new(),
            auth_user_name: String::new(),
            auth_domain: String::new(),
            client_host_name: String::new(),
            module_config_name: String::new(),
            connect_state: ConnectState::Init,
            connect_state_change_time: SystemTime::now(),
            user_token: None,
            auth_backend: None,
            backend: None,
            sbp_compatible: true,
            permissions: 0,
            pre_shadow_state: None,
        }
    }
}

pub struct Session {
    pub id: u32,
    pub fields: Mutex<SessionFields>,
    pub executor: Executor,
}

static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(1);

impl Session {
    /// Allocates a fresh monotonic id (0 is the reserved "no session"
    /// sentinel, per §4.1/§9) and spawns the per-session executor thread.
    pub fn new() -> Arc<Self> {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        Arc::new(Self {
            id,
            fields: Mutex::new(SessionFields::default()),
            executor: Executor::spawn(id),
        })
    }

    pub fn connect_state(&self) -> ConnectState {
        self.fields.lock().unwrap().connect_state
    }

    /// Transition `connect_state`, updating `connect_state_change_time` in
    /// the same critical section (§3's "updated exactly when connectState
    /// changes"). Only ever called from the binding executor thread via
    /// [`super::accessor::SessionAccessor`].
    pub(super) fn set_connect_state(&self, state: ConnectState) {
        let mut fields = self.fields.lock().unwrap();
        fields.connect_state = state;
        fields.connect_state_change_time = SystemTime::now();
    }

    pub fn connect_state_change_time(&self) -> SystemTime {
        self.fields.lock().unwrap().connect_state_change_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_in_init_state() {
        let s = Session::new();
        assert_eq!(s.connect_state(), ConnectState::Init);
        s.executor.stop(false);
    }

    #[test]
    fn session_ids_are_monotonic_and_nonzero() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id, 0);
        assert_ne!(b.id, 0);
        assert!(b.id > a.id);
        a.executor.stop(false);
        b.executor.stop(false);
    }

    #[test]
    fn state_change_updates_timestamp_monotonically() {
        let s = Session::new();
        let t0 = s.connect_state_change_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        s.set_connect_state(ConnectState::Connected);
        let t1 = s.connect_state_change_time();
        assert!(t1 >= t0);
        s.executor.stop(false);
    }
}
