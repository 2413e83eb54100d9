//! `SessionTimeout` sweeper (§4.4), grounded on
//! `original_source/session-manager/common/session/TaskSessionTimeout.cpp`:
//! a dedicated thread, not session-bound, looping on a 10-second timed
//! wait against a stop latch.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::info;

use crate::context::Context;
use crate::session::{ConnectState, Latch, LatchResult};
use crate::task::end::EndTask;

const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

pub struct SessionTimeoutSweeper;

impl SessionTimeoutSweeper {
    /// Spawns the sweeper thread. Signal `stop_latch` to make it exit
    /// before its next scheduled sweep.
    pub fn spawn(ctx: Arc<Context>, stop_latch: Arc<Latch>) -> JoinHandle<()> {
        std::thread::Builder::new()
            .name("smgr-session-timeout-sweeper".into())
            .spawn(move || loop {
                match stop_latch.wait_timeout(SWEEP_INTERVAL) {
                    LatchResult::TimedOut => Self::sweep(&ctx),
                    LatchResult::Signalled | LatchResult::Aborted => return,
                }
            })
            .expect("failed to spawn session-timeout sweeper thread")
    }

    fn sweep(ctx: &Arc<Context>) {
        for session in ctx.session_store.get_all_sessions() {
            if session.connect_state() != ConnectState::Disconnected {
                continue;
            }

            let timeout_minutes = match ctx.property_store.get_number(session.id, "session.timeout") {
                Some(v) => v,
                None => {
                    info!(session_id = session.id, "session.timeout absent, using value of 0");
                    0
                }
            };
            if timeout_minutes < 0 {
                continue;
            }

            let elapsed = session
                .connect_state_change_time()
                .elapsed()
                .unwrap_or(Duration::ZERO);
            let threshold = Duration::from_secs(timeout_minutes as u64 * 60);
            if elapsed >= threshold {
                let task = EndTask::new(ctx.clone(), session.id);
                let _ = session.executor.add_task(Box::new(task));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;
    use crate::session::ConnectState as CS;
    use std::time::Duration as StdDuration;

    #[test]
    fn idle_session_past_timeout_gets_swept() {
        let ctx = Context::init_for_test();
        let session = ctx.session_store.create();
        {
            let accessor = crate::session::SessionAccessor::bind(&session);
            accessor.set_connect_state(CS::Disconnected);
        }
        ctx.property_store.set(
            Some(session.id),
            "session.timeout",
            PropertyValue::Number(0),
        );
        // 0-minute threshold: already "past due" the instant it's set.
        std::thread::sleep(StdDuration::from_millis(5));

        SessionTimeoutSweeper::sweep(&ctx);
        // Give the session's own executor a moment to run the enqueued
        // EndTask.
        std::thread::sleep(StdDuration::from_millis(50));

        assert!(ctx.session_store.get_session(session.id).is_none());
    }

    #[test]
    fn negative_timeout_disables_sweep() {
        let ctx = Context::init_for_test();
        let session = ctx.session_store.create();
        {
            let accessor = crate::session::SessionAccessor::bind(&session);
            accessor.set_connect_state(CS::Disconnected);
        }
        ctx.property_store.set(
            Some(session.id),
            "session.timeout",
            PropertyValue::Number(-1),
        );

        SessionTimeoutSweeper::sweep(&ctx);
        std::thread::sleep(StdDuration::from_millis(30));

        assert!(ctx.session_store.get_session(session.id).is_some());
        session.executor.stop(false);
    }
}
