//! Unified error types for the Session Manager.
//!
//! Mirrors the split the shared protocol library's ambient error style
//! uses: small per-subsystem enums aggregated into one top-level type.
//! Library code never panics or propagates these across an RPC boundary —
//! `§7` requires transient errors to be encoded into the response instead.
//! `SmgrError` only ever surfaces at process-startup (`Context::init`) or
//! in tests.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmgrError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Errors from the Connection/Session/Property stores (§4.1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("session {0} not found")]
    SessionNotFound(u32),
    #[error("connection {0} not found")]
    ConnectionNotFound(u32),
}

/// Errors from RPC decode/dispatch (§4.3, §7).
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("failed to decode request payload: {0}")]
    Decode(String),
    #[error("failed to encode response payload: {0}")]
    Encode(String),
    #[error("enqueue on executor failed: shutdown in progress")]
    ShutdownInProgress,
    #[error("call timed out waiting for a response")]
    Timeout,
}

/// Errors from the Administrative API's authorization layer (§4.3, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("permission denied: missing bit 0x{0:03x}")]
    PermissionDenied(u32),
    #[error("unknown or expired auth token")]
    UnknownToken,
    #[error("session {0} not found")]
    SessionNotFound(u32),
}
