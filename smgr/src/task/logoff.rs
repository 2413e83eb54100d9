//! `Logoff` (§4.4), grounded on
//! `original_source/session-manager/common/otsapi/TaskLogoff.cpp`: the
//! same shape as `Disconnect` but terminal — the session record is
//! removed unconditionally afterward, regardless of whether a connection
//! was bound, matching the original calling `removeSession` outside the
//! `if (connectionId != 0)` branch.

use std::sync::Arc;
use std::time::Duration;

use prost::Message;
use tracing::info;

use crate::context::Context;
use crate::notification::NotificationType;
use crate::rpc::icp::call_out::{next_tag, CallOutWait};
use crate::session::{ConnectState, Task};
use crate::task::stop_remote_control::run_stop_remote_control;
use crate::task::Outcome;

pub struct LogoffTask {
    ctx: Arc<Context>,
    session_id: u32,
    wait: bool,
    timeout: Duration,
    pub outcome: Arc<Outcome<bool>>,
}

impl LogoffTask {
    pub fn new(ctx: Arc<Context>, session_id: u32, wait: bool, timeout: Duration) -> Self {
        Self { ctx, session_id, wait, timeout, outcome: Outcome::new() }
    }

    fn finish(&self) {
        self.ctx.notifications.emit(NotificationType::SessionLogoff, self.session_id);
        self.ctx.session_store.remove(self.session_id);
        self.ctx.notifications.emit(NotificationType::SessionTerminate, self.session_id);
    }
}

impl Task for LogoffTask {
    fn run(&mut self) {
        let Some(session) = self.ctx.session_store.get_session(self.session_id) else {
            info!(session_id = self.session_id, "logoff: session not found");
            self.outcome.set(false);
            return;
        };

        // Continue regardless of whether the frontend actually stopped
        // shadowing — "Shadowing could not be stopped! Continuing any way."
        if session.connect_state() == ConnectState::Shadow
            && !run_stop_remote_control(&self.ctx, self.session_id, self.timeout)
        {
            info!(session_id = self.session_id, "logoff: shadow stop failed, continuing anyway");
        }

        let connection_id = self
            .ctx
            .connection_store
            .get_connection_id_for_session_id(self.session_id);

        if connection_id != 0 {
            let request = icp_proto::LogOffUserSessionRequest { connectionid: connection_id };
            let tag = next_tag();
            self.ctx.pending_call_outs.register(tag);
            self.ctx.outgoing.push(icp_proto::frame::Frame {
                call_type: icp_proto::call_type::CallType::LogOffUserSession.as_u32(),
                tag,
                direction: icp_proto::frame::DIRECTION_REQUEST,
                status: 0,
                payload: request.encode_to_vec(),
            });

            if self.wait {
                match self.ctx.pending_call_outs.wait(tag, self.timeout) {
                    CallOutWait::Response(frame) => {
                        let resp =
                            icp_proto::LogOffUserSessionResponse::decode(&frame.payload[..])
                                .unwrap_or(icp_proto::LogOffUserSessionResponse {
                                    loggedoff: false,
                                });
                        if resp.loggedoff {
                            self.ctx.connection_store.remove(connection_id);
                        }
                    }
                    CallOutWait::Timeout | CallOutWait::Aborted => {}
                }
            }
        }

        // Terminal, unconditionally: remove the session regardless of
        // whether the frontend round-trip above succeeded.
        self.finish();
        self.outcome.set(true);
        session.executor.signal_stop(false);
    }

    fn abort(&mut self) {
        self.outcome.abort();
    }
}
