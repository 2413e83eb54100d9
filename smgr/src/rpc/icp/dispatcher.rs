//! ICP inbound dispatch (§4.3): decode → prepare → (respond now | enqueue
//! on the target session's executor) → encode.

use std::sync::Arc;

use icp_proto::call_type::CallType;
use icp_proto::frame::Frame;
use tracing::{info, warn};

use crate::context::Context;
use crate::session::Task;

use super::call_in::{unknown_call_type_response, CallInHandler};

/// A deferred `CallIn`'s `do_work` plus response-enqueue, run on the
/// target session's executor (§4.3's asynchronous dispatch branch).
struct DeferredCallIn {
    handler: Box<dyn CallInHandler>,
    tag: u32,
    ctx: Arc<Context>,
}

impl Task for DeferredCallIn {
    fn run(&mut self) {
        self.handler.do_work(&self.ctx);
        let frame = Frame {
            call_type: self.handler.call_type().as_u32(),
            tag: self.tag,
            direction: icp_proto::frame::DIRECTION_RESPONSE,
            status: icp_proto::frame::STATUS_OK,
            payload: self.handler.encode_response(),
        };
        self.ctx.outgoing.push(frame);
    }

    fn abort(&mut self) {
        let frame = icp_proto::frame::error_response(self.handler.call_type().as_u32(), self.tag);
        self.ctx.outgoing.push(frame);
    }
}

pub struct Dispatcher;

impl Dispatcher {
    /// Builds the handler for a recognized `callType`, or `None` for an
    /// unrecognized one — callers must answer with
    /// [`unknown_call_type_response`] in that case.
    fn build_handler(call_type: CallType, session_id: u32) -> Option<Box<dyn CallInHandler>> {
        match call_type {
            CallType::SbpVersionInfo => {
                Some(Box::new(super::call_in::VersionInfoCallIn::new(session_id)))
            }
            CallType::LogonUser => {
                Some(Box::new(crate::task::call_in_logon_user::LogonUserCallIn::new()))
            }
            CallType::PropertyBool => {
                Some(Box::new(crate::task::call_in_property::PropertyBoolCallIn::new()))
            }
            CallType::PropertyNumber => {
                Some(Box::new(crate::task::call_in_property::PropertyNumberCallIn::new()))
            }
            CallType::PropertyString => {
                Some(Box::new(crate::task::call_in_property::PropertyStringCallIn::new()))
            }
            CallType::SbpEndSession => {
                Some(Box::new(crate::task::call_in_end_session::EndSessionCallIn::new()))
            }
            _ => None,
        }
    }

    /// Handles one inbound request frame, binding it to `session_id`
    /// (resolved by the caller from the frame's connection/session
    /// context). Deferred calls are enqueued and this returns `None`;
    /// synchronous calls and decode/unknown failures return an immediate
    /// response frame.
    pub fn dispatch(ctx: &Arc<Context>, session_id: u32, frame: Frame) -> Option<Frame> {
        let Some(call_type) = CallType::from_u32(frame.call_type) else {
            warn!(call_type = frame.call_type, "unrecognized ICP callType");
            return Some(unknown_call_type_response(frame.tag));
        };

        let Some(mut handler) = Self::build_handler(call_type, session_id) else {
            warn!(?call_type, "no handler registered for callType");
            return Some(unknown_call_type_response(frame.tag));
        };

        if let Err(err) = handler.decode_request(&frame.payload) {
            info!(?call_type, %err, "failed to decode CallIn payload");
            return Some(icp_proto::frame::error_response(frame.call_type, frame.tag));
        }

        if handler.prepare(ctx) {
            handler.do_work(ctx);
            return Some(super::call_in::respond_now(handler.as_ref(), frame.tag));
        }

        let Some(session) = ctx.session_store.get_session(session_id) else {
            info!(session_id, "CallIn target session not found");
            return Some(icp_proto::frame::error_response(frame.call_type, frame.tag));
        };

        let task = DeferredCallIn { handler, tag: frame.tag, ctx: ctx.clone() };
        if session.executor.add_task(Box::new(task)).is_err() {
            return Some(icp_proto::frame::error_response(frame.call_type, frame.tag));
        }
        None
    }
}
