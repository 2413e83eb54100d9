//! `TaskEnd` (§4.4): the minimal "shut this session down now" task
//! invoked by both SBP `EndSession` and the idle-timeout sweeper,
//! grounded on `original_source/session-manager/common/call/
//! CallInEndSession.cpp`'s `CallInEndSession::doStuff` constructing a
//! bare `TaskEnd`, running it, and reading `getResults()`.

use std::sync::Arc;

use tracing::info;

use crate::context::Context;
use crate::notification::NotificationType;
use crate::session::{ConnectState, SessionAccessor, Task};
use crate::task::Outcome;

pub struct EndTask {
    ctx: Arc<Context>,
    session_id: u32,
    pub outcome: Arc<Outcome<bool>>,
}

impl EndTask {
    pub fn new(ctx: Arc<Context>, session_id: u32) -> Self {
        Self { ctx, session_id, outcome: Outcome::new() }
    }
}

/// Shared teardown body, reused by [`EndTask::run`] and by
/// `CallInEndSession` (both already run on the target session's own
/// executor thread). Returns `false` if the session is already gone.
pub fn end_session(ctx: &Context, session_id: u32) -> bool {
    let Some(session) = ctx.session_store.get_session(session_id) else {
        info!(session_id, "TaskEnd: session already gone");
        return false;
    };

    let accessor = SessionAccessor::bind(&session);
    accessor.destroy_auth_backend();

    match session.connect_state() {
        ConnectState::Active => {
            accessor.set_connect_state(ConnectState::Disconnected);
            accessor.set_connect_state(ConnectState::Down);
        }
        ConnectState::Connected | ConnectState::Disconnected => {
            accessor.set_connect_state(ConnectState::Down);
        }
        _ => {}
    }

    accessor.stop_module();
    accessor.unregister();
    accessor.remove_auth_token();

    ctx.notifications.emit(NotificationType::SessionTerminate, session_id);
    ctx.session_store.remove(session_id);
    session.executor.signal_stop(false);
    true
}

impl Task for EndTask {
    fn run(&mut self) {
        let success = end_session(&self.ctx, self.session_id);
        self.outcome.set(success);
    }

    fn abort(&mut self) {
        self.outcome.abort();
    }
}
