//! `StartRemoteControl` (§4.4), grounded on
//! `original_source/session-manager/common/otsapi/TaskStartRemoteControl.h`.

use std::sync::Arc;
use std::time::Duration;

use prost::Message;

use crate::context::Context;
use crate::notification::NotificationType;
use crate::rpc::icp::call_out::{next_tag, CallOutWait};
use crate::session::{SessionAccessor, Task};
use crate::task::Outcome;

pub struct StartRemoteControlTask {
    ctx: Arc<Context>,
    source_connection_id: u32,
    target_session_id: u32,
    target_connection_id: u32,
    hotkey_vk: u32,
    hotkey_modifiers: u32,
    flags: u32,
    timeout: Duration,
    pub outcome: Arc<Outcome<bool>>,
}

impl StartRemoteControlTask {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: Arc<Context>,
        source_connection_id: u32,
        target_session_id: u32,
        target_connection_id: u32,
        hotkey_vk: u32,
        hotkey_modifiers: u32,
        flags: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            ctx,
            source_connection_id,
            target_session_id,
            target_connection_id,
            hotkey_vk,
            hotkey_modifiers,
            flags,
            timeout,
            outcome: Outcome::new(),
        }
    }
}

impl Task for StartRemoteControlTask {
    fn run(&mut self) {
        let request = icp_proto::OtsApiStartRemoteControlRequest {
            connectionid: self.source_connection_id,
            targetconnectionid: self.target_connection_id,
            hotkeyvk: self.hotkey_vk,
            hotkeymodifiers: self.hotkey_modifiers,
            flags: self.flags,
        };
        let tag = next_tag();
        self.ctx.pending_call_outs.register(tag);
        self.ctx.outgoing.push(icp_proto::frame::Frame {
            call_type: icp_proto::call_type::CallType::OtsApiStartRemoteControl.as_u32(),
            tag,
            direction: icp_proto::frame::DIRECTION_REQUEST,
            status: 0,
            payload: request.encode_to_vec(),
        });

        let success = match self.ctx.pending_call_outs.wait(tag, self.timeout) {
            CallOutWait::Response(frame) => {
                icp_proto::OtsApiStartRemoteControlResponse::decode(&frame.payload[..])
                    .map(|r| r.success)
                    .unwrap_or(false)
            }
            CallOutWait::Timeout | CallOutWait::Aborted => false,
        };

        if !success {
            self.outcome.set(false);
            return;
        }

        let Some(target) = self.ctx.session_store.get_session(self.target_session_id) else {
            self.outcome.set(false);
            return;
        };

        let accessor = SessionAccessor::bind(&target);
        accessor.start_remote_control();
        self.ctx
            .notifications
            .emit(NotificationType::SessionRemoteControl, self.target_session_id);
        self.outcome.set(true);
    }

    fn abort(&mut self) {
        self.outcome.abort();
    }
}
