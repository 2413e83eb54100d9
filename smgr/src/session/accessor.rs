//! `SessionAccessor` (§4.2), grounded on
//! `original_source/session-manager/common/session/SessionAccessor.h`.
//!
//! A capability struct binding `&Session`, not inheritance: every mutating
//! method the original exposes (`setConnectState`, `generateUserToken`,
//! `startModule`/`stopModule`, `disconnect`, `unregisterSession`,
//! `removeAuthToken`, `startRemoteControl`, `stopRemoteControl`,
//! `setSBPVersion`, `destroyAuthBackend`) becomes a method here. Only the
//! binding executor thread ever constructs one, so mutation is already
//! serialized without an extra lock.

use super::session::{ConnectState, Session};

pub struct SessionAccessor<'a> {
    session: &'a Session,
}

impl<'a> SessionAccessor<'a> {
    /// Binds the accessor to `session`. Binding does not itself acquire a
    /// lock — correctness comes from only the executor thread ever
    /// binding a given session.
    pub fn bind(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn set_connect_state(&self, state: ConnectState) {
        self.session.set_connect_state(state);
    }

    pub fn generate_user_token(&self, token: String) {
        self.session.fields.lock().unwrap().user_token = Some(token);
    }

    pub fn start_module(&self, backend: String) {
        self.session.fields.lock().unwrap().backend = Some(backend);
    }

    pub fn stop_module(&self) {
        self.session.fields.lock().unwrap().backend = None;
    }

    pub fn destroy_auth_backend(&self) {
        self.session.fields.lock().unwrap().auth_backend = None;
    }

    /// `unregisterSession` (§4.2, §4.4): drops the session's permissions
    /// and module config binding as a distinct step from the session-store
    /// eviction the caller performs afterward — a session that has been
    /// unregistered can no longer be targeted by any permission-gated or
    /// module-bound operation, even if something still holds its id.
    pub fn unregister(&self) {
        let mut fields = self.session.fields.lock().unwrap();
        fields.permissions = 0;
        fields.module_config_name.clear();
    }

    pub fn set_permissions(&self, permissions: u32) {
        self.session.fields.lock().unwrap().permissions = permissions;
    }

    pub fn remove_auth_token(&self) {
        self.session.fields.lock().unwrap().user_token = None;
    }

    pub fn set_sbp_compatible(&self, compatible: bool) {
        self.session.fields.lock().unwrap().sbp_compatible = compatible;
    }

    /// Disconnect: state transition plus stopping the backend module,
    /// preserving the session record (§4.4's `Disconnect`).
    pub fn disconnect(&self) {
        self.stop_module();
        self.set_connect_state(ConnectState::Disconnected);
    }

    /// Enter Shadow state, remembering the state to restore on
    /// `stopRemoteControl` (§4.4's `StartRemoteControl` stage two).
    pub fn start_remote_control(&self) {
        let previous = self.session.connect_state();
        self.session.fields.lock().unwrap().pre_shadow_state = Some(previous);
        self.set_connect_state(ConnectState::Shadow);
    }

    /// Leave Shadow state, returning to the pre-shadow state
    /// (§4.4's `StopRemoteControl`). Falls back to `previous` if no
    /// pre-shadow state was recorded (e.g. direct invocation in tests).
    pub fn stop_remote_control(&self, previous: ConnectState) {
        let restore = self.session.fields.lock().unwrap().pre_shadow_state.take().unwrap_or(previous);
        self.set_connect_state(restore);
    }
}
