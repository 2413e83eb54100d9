//! `Disconnect` (§4.4), grounded on
//! `original_source/session-manager/common/otsapi/TaskDisconnect.cpp`.

use std::sync::Arc;
use std::time::Duration;

use prost::Message;
use tracing::info;

use crate::context::Context;
use crate::rpc::icp::call_out::{next_tag, CallOutWait};
use crate::session::{ConnectState, SessionAccessor, Task};
use crate::task::stop_remote_control::run_stop_remote_control;
use crate::task::Outcome;

pub struct DisconnectTask {
    ctx: Arc<Context>,
    session_id: u32,
    wait: bool,
    timeout: Duration,
    pub outcome: Arc<Outcome<bool>>,
}

impl DisconnectTask {
    pub fn new(ctx: Arc<Context>, session_id: u32, wait: bool, timeout: Duration) -> Self {
        Self { ctx, session_id, wait, timeout, outcome: Outcome::new() }
    }
}

impl Task for DisconnectTask {
    fn run(&mut self) {
        let Some(session) = self.ctx.session_store.get_session(self.session_id) else {
            info!(session_id = self.session_id, "disconnect: session not found");
            self.outcome.set(false);
            return;
        };

        // Shadow pre-stop: a shadowed session must leave Shadow before it
        // can be disconnected, per the original's doStuff ordering. Continue
        // regardless of whether the frontend actually stopped shadowing —
        // "Shadowing could not be stopped! Continuing any way."
        if session.connect_state() == ConnectState::Shadow
            && !run_stop_remote_control(&self.ctx, self.session_id, self.timeout)
        {
            info!(session_id = self.session_id, "disconnect: shadow stop failed, continuing anyway");
        }

        let connection_id = self
            .ctx
            .connection_store
            .get_connection_id_for_session_id(self.session_id);
        if connection_id == 0 {
            // Already detached: success, nothing to do.
            self.outcome.set(true);
            return;
        }

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

        if !self.wait {
            // Open question (spec.md §9): wait=false issues the call but
            // leaves the connection record in place; the eventual reply
            // is discarded by PendingCallOuts once it lingers unclaimed.
            self.outcome.set(true);
            return;
        }

        match self.ctx.pending_call_outs.wait(tag, self.timeout) {
            CallOutWait::Response(frame) => {
                let resp = icp_proto::LogOffUserSessionResponse::decode(&frame.payload[..])
                    .unwrap_or(icp_proto::LogOffUserSessionResponse { loggedoff: false });
                if resp.loggedoff {
                    let accessor = SessionAccessor::bind(&session);
                    accessor.disconnect();
                    self.ctx.connection_store.remove(connection_id);
                    self.outcome.set(true);
                } else {
                    self.outcome.set(false);
                }
            }
            CallOutWait::Timeout | CallOutWait::Aborted => {
                self.outcome.set(false);
            }
        }
    }

    fn abort(&mut self) {
        self.outcome.abort();
    }
}
