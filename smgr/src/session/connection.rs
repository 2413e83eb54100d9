//! Connection record (§3): one live client transport bound to at most one
//! session.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
pub struct Connection {
    pub id: u32,
    pub session_id: Mutex<u32>,
    pub auth_token: String,
    pub permissions: u32,
}

static NEXT_CONNECTION_ID: AtomicU32 = AtomicU32::new(1);

impl Connection {
    /// `session_id = 0` means detached, per §3/§4.1.
    pub fn new(session_id: u32, auth_token: String, permissions: u32) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            session_id: Mutex::new(session_id),
            auth_token,
            permissions,
        }
    }

    pub fn session_id(&self) -> u32 {
        *self.session_id.lock().unwrap()
    }

    pub fn detach(&self) {
        *self.session_id.lock().unwrap() = 0;
    }
}
