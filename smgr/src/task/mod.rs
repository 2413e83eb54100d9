pub mod call_in_end_session;
pub mod call_in_logon_user;
pub mod call_in_property;
pub mod disconnect;
pub mod end;
pub mod logoff;
pub mod session_timeout;
pub mod shutdown;
pub mod start_remote_control;
pub mod stop_remote_control;

use std::sync::{Arc, Mutex};

use crate::session::Latch;

/// Common completion-result plumbing for an `InformableTask`: a latch plus
/// a slot for the value it resolves to, observed by external waiters via
/// [`Outcome::wait`].
pub struct Outcome<T> {
    latch: Arc<Latch>,
    value: Mutex<Option<T>>,
}

impl<T: Clone> Outcome<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { latch: Latch::new(), value: Mutex::new(None) })
    }

    pub fn latch(&self) -> Arc<Latch> {
        self.latch.clone()
    }

    pub fn set(&self, value: T) {
        *self.value.lock().unwrap() = Some(value);
        self.latch.signal();
    }

    pub fn abort(&self) {
        self.latch.abort();
    }

    pub fn wait(&self, timeout: std::time::Duration) -> Option<T> {
        match self.latch.wait_timeout(timeout) {
            crate::session::LatchResult::Signalled => self.value.lock().unwrap().clone(),
            _ => None,
        }
    }
}
