//! Inbound `CallIn` dispatch (§4.3): `{decode_request, prepare, do_work,
//! encode_response}`, the tagged-variant-plus-dispatch-trait redesign of
//! the original's inheritance hierarchy (§9).

use icp_proto::call_type::CallType;
use icp_proto::frame::{Frame, DIRECTION_RESPONSE, STATUS_ERROR, STATUS_OK};

use crate::context::Context;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A single inbound call's lifecycle. `prepare` returns `true` when the
/// handler can respond immediately (synchronous calls that only touch
/// stores); `false` defers `do_work` to the target session's executor.
pub trait CallInHandler: Send {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError>;
    fn prepare(&mut self, ctx: &Context) -> bool;
    fn do_work(&mut self, ctx: &Context);
    fn encode_response(&self) -> Vec<u8>;
    fn call_type(&self) -> CallType;
}

/// Runs a handler's full synchronous path and produces the response
/// frame, used both by the dispatcher's immediate-respond branch and by
/// tasks that run a deferred `do_work` on an executor.
pub fn respond_now(handler: &dyn CallInHandler, tag: u32) -> Frame {
    Frame {
        call_type: handler.call_type().as_u32(),
        tag,
        direction: DIRECTION_RESPONSE,
        status: STATUS_OK,
        payload: handler.encode_response(),
    }
}

/// SBP VersionInfo (§4.4, §8 scenario 5): compares the frontend's
/// advertised major version against the compiled constant; on mismatch,
/// flips `sbpCompatible` false but still replies with the manager's own
/// version — the manager's half of the handshake always answers truthfully
/// about what it speaks.
pub struct VersionInfoCallIn {
    pub session_id: u32,
    pub peer_major: u32,
    pub peer_minor: u32,
    pub compatible: bool,
}

pub const OGON_PROTOCOL_VERSION_MAJOR: u32 = 1;
pub const OGON_PROTOCOL_VERSION_MINOR: u32 = 0;

impl VersionInfoCallIn {
    pub fn new(session_id: u32) -> Self {
        Self { session_id, peer_major: 0, peer_minor: 0, compatible: true }
    }
}

impl CallInHandler for VersionInfoCallIn {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        if bytes.len() < 8 {
            return Err(DecodeError::Malformed("VersionInfo payload too short".into()));
        }
        self.peer_major = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        self.peer_minor = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        Ok(())
    }

    fn prepare(&mut self, _ctx: &Context) -> bool {
        // Synchronous: touches no executor, answered on the reader thread.
        true
    }

    fn do_work(&mut self, ctx: &Context) {
        self.compatible = self.peer_major == OGON_PROTOCOL_VERSION_MAJOR;
        if let Some(session) = ctx.session_store.get_session(self.session_id) {
            let accessor = crate::session::SessionAccessor::bind(&session);
            accessor.set_sbp_compatible(self.compatible);
        }
    }

    fn encode_response(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8);
        out.extend_from_slice(&OGON_PROTOCOL_VERSION_MAJOR.to_be_bytes());
        out.extend_from_slice(&OGON_PROTOCOL_VERSION_MINOR.to_be_bytes());
        out
    }

    fn call_type(&self) -> CallType {
        CallType::SbpVersionInfo
    }
}

/// Builds the unknown-callType fallback response (§6, §7, §8): `status=1`,
/// empty payload, tag preserved.
pub fn unknown_call_type_response(tag: u32) -> Frame {
    icp_proto::frame::error_response(0, tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_decode_rejects_short_payload() {
        let mut call = VersionInfoCallIn::new(1);
        assert!(call.decode_request(&[0u8; 4]).is_err());
    }

    #[test]
    fn version_info_decodes_major_minor() {
        let mut call = VersionInfoCallIn::new(1);
        let mut payload = Vec::new();
        payload.extend_from_slice(&7u32.to_be_bytes());
        payload.extend_from_slice(&2u32.to_be_bytes());
        call.decode_request(&payload).unwrap();
        assert_eq!(call.peer_major, 7);
        assert_eq!(call.peer_minor, 2);
    }

    #[test]
    fn response_always_carries_manager_version() {
        let call = VersionInfoCallIn::new(1);
        let resp = call.encode_response();
        assert_eq!(&resp[0..4], &OGON_PROTOCOL_VERSION_MAJOR.to_be_bytes());
    }

    #[test]
    fn unknown_call_type_gets_error_status_and_preserves_tag() {
        let frame = unknown_call_type_response(42);
        assert_eq!(frame.tag, 42);
        assert_eq!(frame.status, STATUS_ERROR);
        assert!(frame.payload.is_empty());
    }
}
