//! `Context` (§4.5): the explicit, non-singleton replacement for the
//! original `ApplicationContext`. Built by [`Context::init`] in the
//! construction order spec.md §4.5 names (property store → connection
//! store → session store → outgoing queue → RPC dispatcher → admin API
//! server → timeout sweeper) and torn down in reverse by
//! [`Context::shutdown`].

use std::sync::Arc;

use tracing::info;

use crate::auth::{AcceptAllAuthProvider, AuthProvider};
use crate::backend::{BackendModule, NullBackendModule};
use crate::config::Config;
use crate::error::SmgrError;
use crate::notification::{NotificationSink, NotificationType, RecordingEmitter};
use crate::property::PropertyStore;
use crate::registry::{ConnectionStore, SessionStore};
use crate::rpc::icp::call_out::PendingCallOuts;
use crate::rpc::icp::outgoing::OutgoingQueue;
use crate::session::Latch;
use crate::task::session_timeout::SessionTimeoutSweeper;

pub struct Context {
    pub property_store: PropertyStore,
    pub connection_store: ConnectionStore,
    pub session_store: SessionStore,
    pub outgoing: OutgoingQueue,
    pub pending_call_outs: PendingCallOuts,
    pub notifications: Box<dyn NotificationSink>,
    pub auth_provider: Box<dyn AuthProvider>,
    pub backend_module: Box<dyn BackendModule>,
    sweeper_stop: Arc<Latch>,
    sweeper_handle: std::sync::Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl Context {
    /// Construction order per §4.5. `notifications`/`auth_provider`/
    /// `backend_module` are the external-collaborator boundaries (§1);
    /// callers supply real implementations in `main`, tests supply
    /// stand-ins via [`Context::init_for_test`].
    pub fn init(
        _config: &Config,
        notifications: Box<dyn NotificationSink>,
        auth_provider: Box<dyn AuthProvider>,
        backend_module: Box<dyn BackendModule>,
    ) -> Result<Arc<Context>, SmgrError> {
        let property_store = PropertyStore::new();
        let connection_store = ConnectionStore::new();
        let session_store = SessionStore::new();
        let outgoing = OutgoingQueue::new();
        let pending_call_outs = PendingCallOuts::new();
        let sweeper_stop = Latch::new();

        let ctx = Arc::new(Context {
            property_store,
            connection_store,
            session_store,
            outgoing,
            pending_call_outs,
            notifications,
            auth_provider,
            backend_module,
            sweeper_stop: sweeper_stop.clone(),
            sweeper_handle: std::sync::Mutex::new(None),
        });

        let sweeper = SessionTimeoutSweeper::spawn(ctx.clone(), sweeper_stop);
        *ctx.sweeper_handle.lock().unwrap() = Some(sweeper);

        info!("context initialized");
        Ok(ctx)
    }

    /// Builds a `Context` with in-process stand-ins for every external
    /// collaborator — used by unit/integration tests that need a fully
    /// wired control plane without a real DBus session, TLS material, or
    /// an authentication backend.
    pub fn init_for_test() -> Arc<Context> {
        Self::init(
            &Config::default(),
            Box::new(RecordingEmitter::new()),
            Box::new(AcceptAllAuthProvider),
            Box::new(NullBackendModule),
        )
        .expect("test context construction is infallible")
    }

    /// Reverse-order teardown (§4.5): sweeper first, then every live
    /// session is run through [`crate::task::shutdown::ShutdownTask`] and
    /// its executor drained and joined, before the session record is
    /// released from the store.
    pub fn shutdown(self: Arc<Context>) {
        self.sweeper_stop.signal();
        if let Some(handle) = self.sweeper_handle.lock().unwrap().take() {
            let _ = handle.join();
        }

        for session in self.session_store.get_all_sessions() {
            let task = crate::task::shutdown::ShutdownTask::new(self.clone(), session.clone());
            let _ = session.executor.add_task(Box::new(task));
            session.executor.stop(true);
            self.session_store.remove(session.id);
        }
        info!("context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_for_test_wires_a_usable_context() {
        let ctx = Context::init_for_test();
        let session = ctx.session_store.create();
        assert!(ctx.session_store.get_session(session.id).is_some());
        ctx.shutdown();
    }
}
