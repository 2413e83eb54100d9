//! `Shutdown` (§4.4), grounded on
//! `original_source/session-manager/common/session/TaskShutdown.cpp`:
//! destroy the staged auth backend, transition to `Down`, stop the
//! backend module, unregister the session, revoke its auth token, and
//! request the executor to self-terminate without draining.

use std::sync::Arc;

use tracing::info;

use crate::context::Context;
use crate::notification::NotificationType;
use crate::session::{ConnectState, Session, SessionAccessor, Task};

pub struct ShutdownTask {
    ctx: Arc<Context>,
    session: Arc<Session>,
}

impl ShutdownTask {
    pub fn new(ctx: Arc<Context>, session: Arc<Session>) -> Self {
        Self { ctx, session }
    }
}

impl Task for ShutdownTask {
    fn run(&mut self) {
        // destroyAuthBackend() unconditionally precedes the state
        // transition — this ordering is load-bearing per SPEC_FULL §3.
        let accessor = SessionAccessor::bind(&self.session);
        accessor.destroy_auth_backend();

        // Active falls through Disconnected on its way to Down — two
        // separate transitions, matching the original's case fallthrough.
        let current = self.session.connect_state();
        match current {
            ConnectState::Active => {
                accessor.set_connect_state(ConnectState::Disconnected);
                accessor.set_connect_state(ConnectState::Down);
            }
            ConnectState::Connected | ConnectState::Disconnected => {
                accessor.set_connect_state(ConnectState::Down);
            }
            // Init, Shadow, Down: no-op transition, still finish teardown.
            _ => {}
        }

        accessor.stop_module();
        accessor.unregister();
        accessor.remove_auth_token();

        self.ctx.notifications.emit(NotificationType::SessionTerminate, self.session.id);
        info!(session_id = self.session.id, "session shut down");

        // Self-termination without drain: queue a stop behind this task
        // rather than joining from inside the executor's own thread.
        self.session.executor.signal_stop(false);
    }
}
