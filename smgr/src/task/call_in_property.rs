//! `CallIn PropertyBool/Number/String` (§4.1, §4.4): the frontend asks for
//! a single property by path, scoped to the session its connection is
//! currently bound to. Synchronous — the property store is a plain
//! read-only lookup, no executor hop needed.

use prost::Message;

use icp_proto::call_type::CallType;

use crate::context::Context;
use crate::rpc::icp::call_in::{CallInHandler, DecodeError};

fn session_id_for_connection(ctx: &Context, connection_id: u32) -> u32 {
    ctx.connection_store.get(connection_id).map(|c| c.session_id()).unwrap_or(0)
}

pub struct PropertyBoolCallIn {
    connection_id: u32,
    path: String,
    success: bool,
    value: bool,
}

impl PropertyBoolCallIn {
    pub fn new() -> Self {
        Self { connection_id: 0, path: String::new(), success: false, value: false }
    }
}

impl Default for PropertyBoolCallIn {
    fn default() -> Self {
        Self::new()
    }
}

impl CallInHandler for PropertyBoolCallIn {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let req = icp_proto::PropertyBoolRequest::decode(bytes)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.connection_id = req.connectionid;
        self.path = req.path;
        Ok(())
    }

    fn prepare(&mut self, _ctx: &Context) -> bool {
        true
    }

    fn do_work(&mut self, ctx: &Context) {
        let session_id = session_id_for_connection(ctx, self.connection_id);
        match ctx.property_store.get_bool(session_id, &self.path) {
            Some(value) => {
                self.success = true;
                self.value = value;
            }
            None => self.success = false,
        }
    }

    fn encode_response(&self) -> Vec<u8> {
        icp_proto::PropertyBoolResponse { success: self.success, value: self.value }.encode_to_vec()
    }

    fn call_type(&self) -> CallType {
        CallType::PropertyBool
    }
}

pub struct PropertyNumberCallIn {
    connection_id: u32,
    path: String,
    success: bool,
    value: i64,
}

impl PropertyNumberCallIn {
    pub fn new() -> Self {
        Self { connection_id: 0, path: String::new(), success: false, value: 0 }
    }
}

impl Default for PropertyNumberCallIn {
    fn default() -> Self {
        Self::new()
    }
}

impl CallInHandler for PropertyNumberCallIn {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let req = icp_proto::PropertyNumberRequest::decode(bytes)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.connection_id = req.connectionid;
        self.path = req.path;
        Ok(())
    }

    fn prepare(&mut self, _ctx: &Context) -> bool {
        true
    }

    fn do_work(&mut self, ctx: &Context) {
        let session_id = session_id_for_connection(ctx, self.connection_id);
        match ctx.property_store.get_number(session_id, &self.path) {
            Some(value) => {
                self.success = true;
                self.value = value;
            }
            None => self.success = false,
        }
    }

    fn encode_response(&self) -> Vec<u8> {
        icp_proto::PropertyNumberResponse { success: self.success, value: self.value }
            .encode_to_vec()
    }

    fn call_type(&self) -> CallType {
        CallType::PropertyNumber
    }
}

pub struct PropertyStringCallIn {
    connection_id: u32,
    path: String,
    success: bool,
    value: String,
}

impl PropertyStringCallIn {
    pub fn new() -> Self {
        Self { connection_id: 0, path: String::new(), success: false, value: String::new() }
    }
}

impl Default for PropertyStringCallIn {
    fn default() -> Self {
        Self::new()
    }
}

impl CallInHandler for PropertyStringCallIn {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let req = icp_proto::PropertyStringRequest::decode(bytes)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.connection_id = req.connectionid;
        self.path = req.path;
        Ok(())
    }

    fn prepare(&mut self, _ctx: &Context) -> bool {
        true
    }

    fn do_work(&mut self, ctx: &Context) {
        let session_id = session_id_for_connection(ctx, self.connection_id);
        match ctx.property_store.get_string(session_id, &self.path) {
            Some(value) => {
                self.success = true;
                self.value = value;
            }
            None => self.success = false,
        }
    }

    fn encode_response(&self) -> Vec<u8> {
        icp_proto::PropertyStringResponse { success: self.success, value: self.value.clone() }
            .encode_to_vec()
    }

    fn call_type(&self) -> CallType {
        CallType::PropertyString
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;

    #[test]
    fn bool_property_resolves_through_the_connection_s_session() {
        let ctx = Context::init_for_test();
        let session = ctx.session_store.create();
        ctx.property_store.set(Some(session.id), "shadow.allowed", PropertyValue::Bool(true));
        let conn = ctx.connection_store.create(session.id, "tok".into(), 0);

        let mut call = PropertyBoolCallIn::new();
        let req = icp_proto::PropertyBoolRequest { connectionid: conn.id, path: "shadow.allowed".into() };
        call.decode_request(&req.encode_to_vec()).unwrap();
        call.do_work(&ctx);

        assert!(call.success);
        assert!(call.value);
    }

    #[test]
    fn unknown_path_reports_failure_not_a_default_value() {
        let ctx = Context::init_for_test();
        let session = ctx.session_store.create();
        let conn = ctx.connection_store.create(session.id, "tok".into(), 0);

        let mut call = PropertyNumberCallIn::new();
        let req = icp_proto::PropertyNumberRequest { connectionid: conn.id, path: "nope".into() };
        call.decode_request(&req.encode_to_vec()).unwrap();
        call.do_work(&ctx);

        assert!(!call.success);
    }

    #[test]
    fn unbound_connection_id_falls_back_to_the_global_scope() {
        let ctx = Context::init_for_test();
        ctx.property_store.set(None, "product.name", PropertyValue::Str("ogon".into()));

        let mut call = PropertyStringCallIn::new();
        let req = icp_proto::PropertyStringRequest { connectionid: 999, path: "product.name".into() };
        call.decode_request(&req.encode_to_vec()).unwrap();
        call.do_work(&ctx);

        assert!(call.success);
        assert_eq!(call.value, "ogon");
    }
}
