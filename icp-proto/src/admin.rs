//! Wire types for the Administrative API.
//!
//! The original ogon exposed this as a Thrift IDL service over
//! `TSSLSocket`. No Thrift crate appears anywhere in the reference corpus
//! this crate was grounded on, so the shape is kept (one call at a time per
//! TLS connection, `logonConnection` first, `authToken`-gated afterward)
//! but the encoding is a length-prefixed JSON request/response, the same
//! style the frontend-facing JSON-RPC protocol in the pack's agent crates
//! uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An Administrative API request: a method name plus opaque JSON params.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A successful Administrative API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub result: Value,
}

impl AdminResponse {
    pub fn new(result: Value) -> Self {
        Self { result }
    }
}

/// An Administrative API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminErrorResponse {
    pub code: i64,
    pub message: String,
}

impl AdminErrorResponse {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Either half of an Administrative API reply, tagged for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AdminReply {
    Ok(AdminResponse),
    Err(AdminErrorResponse),
}

pub mod errors {
    /// The request body could not be parsed as JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// `authToken` was missing, unknown, or lacked the required permission bit.
    pub const PERMISSION_DENIED: i64 = -32001;
    /// The referenced session or connection id does not exist.
    pub const NOT_FOUND: i64 = -32002;
    /// A `CallOut` round-trip to the frontend did not complete in time.
    pub const TIMEOUT: i64 = -32003;
    /// Any other internal failure.
    pub const INTERNAL_ERROR: i64 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_round_trips_with_params() {
        let req = AdminRequest {
            method: "logonConnection".into(),
            params: json!({"user": "alice", "password": "x", "domain": "WORKGROUP"}),
        };
        let s = serde_json::to_string(&req).unwrap();
        let back: AdminRequest = serde_json::from_str(&s).unwrap();
        assert_eq!(back.method, "logonConnection");
        assert_eq!(back.params["user"], "alice");
    }

    #[test]
    fn request_defaults_params_when_absent() {
        let req: AdminRequest = serde_json::from_str(r#"{"method":"ping"}"#).unwrap();
        assert!(req.params.is_null());
    }

    #[test]
    fn reply_tags_ok_and_err_distinctly() {
        let ok = AdminReply::Ok(AdminResponse::new(json!({"sessionId": 3})));
        let err = AdminReply::Err(AdminErrorResponse::new(
            errors::PERMISSION_DENIED,
            "missing QueryInformation bit",
        ));

        let ok_json: Value = serde_json::from_str(&serde_json::to_string(&ok).unwrap()).unwrap();
        let err_json: Value =
            serde_json::from_str(&serde_json::to_string(&err).unwrap()).unwrap();

        assert_eq!(ok_json["status"], "ok");
        assert_eq!(err_json["status"], "err");
        assert_eq!(err_json["code"], errors::PERMISSION_DENIED);
    }
}
