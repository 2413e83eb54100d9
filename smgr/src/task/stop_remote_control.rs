//! `StopRemoteControl` (§4.4), grounded on
//! `original_source/session-manager/common/otsapi/TaskStopRemoteControl.cpp`:
//! no-op success when the session is not in `Shadow`; otherwise round-trips
//! the frontend, then flips the session back to its pre-shadow state.

use std::sync::Arc;
use std::time::Duration;

use prost::Message;

use crate::context::Context;
use crate::notification::NotificationType;
use crate::rpc::icp::call_out::{next_tag, CallOutWait};
use crate::session::{ConnectState, SessionAccessor, Task};
use crate::task::Outcome;

pub struct StopRemoteControlTask {
    ctx: Arc<Context>,
    session_id: u32,
    timeout: Duration,
    pub outcome: Arc<Outcome<bool>>,
}

impl StopRemoteControlTask {
    pub fn new(ctx: Arc<Context>, session_id: u32, timeout: Duration) -> Self {
        Self { ctx, session_id, timeout, outcome: Outcome::new() }
    }
}

/// Shared Shadow-exit body, reused by [`StopRemoteControlTask::run`] and
/// directly by `Disconnect`/`Logoff`'s inline shadow-pre-stop (both already
/// run on the target session's own executor thread, so there is no need to
/// round-trip through a separate task). Grounded on
/// `TaskStopRemoteControl::run`: resolves `connectionId` from the session
/// store itself rather than taking it as a parameter, returning `false`
/// early if the session isn't bound to a connection.
pub fn run_stop_remote_control(ctx: &Arc<Context>, session_id: u32, timeout: Duration) -> bool {
    let Some(session) = ctx.session_store.get_session(session_id) else {
        return false;
    };

    if session.connect_state() != ConnectState::Shadow {
        return true;
    }

    let connection_id = ctx.connection_store.get_connection_id_for_session_id(session_id);
    if connection_id == 0 {
        return false;
    }

    let request = icp_proto::OtsApiStopRemoteControlRequest { connectionid: connection_id };
    let tag = next_tag();
    ctx.pending_call_outs.register(tag);
    ctx.outgoing.push(icp_proto::frame::Frame {
        call_type: icp_proto::call_type::CallType::OtsApiStopRemoteControl.as_u32(),
        tag,
        direction: icp_proto::frame::DIRECTION_REQUEST,
        status: 0,
        payload: request.encode_to_vec(),
    });

    let success = match ctx.pending_call_outs.wait(tag, timeout) {
        CallOutWait::Response(frame) => {
            icp_proto::OtsApiStopRemoteControlResponse::decode(&frame.payload[..])
                .map(|r| r.success)
                .unwrap_or(false)
        }
        CallOutWait::Timeout | CallOutWait::Aborted => false,
    };

    if success {
        let accessor = SessionAccessor::bind(&session);
        accessor.stop_remote_control(ConnectState::Active);
        ctx.notifications.emit(NotificationType::SessionRemoteControl, session_id);
    }
    success
}

impl Task for StopRemoteControlTask {
    fn run(&mut self) {
        let success = run_stop_remote_control(&self.ctx, self.session_id, self.timeout);
        self.outcome.set(success);
    }

    fn abort(&mut self) {
        self.outcome.abort();
    }
}
