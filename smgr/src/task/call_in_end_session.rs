//! `CallIn EndSession` (§4.4), grounded on
//! `original_source/session-manager/common/call/CallInEndSession.cpp`:
//! the backend (via SBP) asks the manager to tear its own session down.
//! Deferred to the target session's executor since it mutates session
//! state and self-terminates.

use prost::Message;

use icp_proto::call_type::CallType;

use crate::context::Context;
use crate::rpc::icp::call_in::{CallInHandler, DecodeError};
use crate::task::end::end_session;

pub struct EndSessionCallIn {
    session_id: u32,
    success: bool,
}

impl EndSessionCallIn {
    pub fn new() -> Self {
        Self { session_id: 0, success: false }
    }
}

impl Default for EndSessionCallIn {
    fn default() -> Self {
        Self::new()
    }
}

impl CallInHandler for EndSessionCallIn {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let req = icp_proto::EndSessionRequest::decode(bytes)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.session_id = req.sessionid;
        Ok(())
    }

    fn prepare(&mut self, _ctx: &Context) -> bool {
        // Mutates session state and self-terminates the executor: must run
        // on the target session's own thread, not the reader thread.
        false
    }

    fn do_work(&mut self, ctx: &Context) {
        self.success = end_session(ctx, self.session_id);
    }

    fn encode_response(&self) -> Vec<u8> {
        icp_proto::EndSessionResponse { success: self.success }.encode_to_vec()
    }

    fn call_type(&self) -> CallType {
        CallType::SbpEndSession
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_an_existing_session() {
        let ctx = Context::init_for_test();
        let session = ctx.session_store.create();

        let mut call = EndSessionCallIn::new();
        let req = icp_proto::EndSessionRequest { sessionid: session.id };
        call.decode_request(&req.encode_to_vec()).unwrap();
        assert!(!call.prepare(&ctx));
        call.do_work(&ctx);

        assert!(call.success);
        assert!(ctx.session_store.get_session(session.id).is_none());
    }

    #[test]
    fn missing_session_reports_failure() {
        let ctx = Context::init_for_test();

        let mut call = EndSessionCallIn::new();
        let req = icp_proto::EndSessionRequest { sessionid: 404 };
        call.decode_request(&req.encode_to_vec()).unwrap();
        call.do_work(&ctx);

        assert!(!call.success);
    }
}
