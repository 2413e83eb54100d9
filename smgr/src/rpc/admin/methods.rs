//! Administrative API method stubs (§4.3, §6): one function per IDL call,
//! each gated on the permission bit spec.md §6 assigns it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::context::Context;
use crate::error::AdminError;
use crate::permission;
use crate::session::Task;
use crate::task::disconnect::DisconnectTask;
use crate::task::logoff::LogoffTask;
use crate::task::start_remote_control::StartRemoteControlTask;
use crate::task::stop_remote_control::StopRemoteControlTask;

use super::auth::SessionTable;

fn param_str(params: &Value, key: &str) -> Option<String> {
    params.get(key)?.as_str().map(str::to_string)
}

fn param_u32(params: &Value, key: &str) -> Option<u32> {
    params.get(key)?.as_u64().map(|v| v as u32)
}

fn param_bool(params: &Value, key: &str, default: bool) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn param_timeout(params: &Value, key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(params.get(key).and_then(Value::as_u64).unwrap_or(default_ms))
}

/// `logonConnection(user, pw, domain) -> (authToken, permissionsBitmask)`
/// (§4.3, §6). Not permission-gated — this call establishes the caller's
/// permissions.
pub fn logon_connection(ctx: &Arc<Context>, tokens: &SessionTable, params: &Value) -> Result<Value, AdminError> {
    let user = param_str(params, "user").unwrap_or_default();
    let pw = param_str(params, "pw").unwrap_or_default();
    let domain = param_str(params, "domain").unwrap_or_default();

    let token = ctx
        .auth_provider
        .authenticate(&user, &domain, &pw)
        .ok_or(AdminError::UnknownToken)?;

    let permissions = permission::PRESET_USER;
    let connection = ctx.connection_store.create(0, token.clone(), permissions);
    tokens.insert(token.clone(), connection.id, permissions);

    Ok(json!({ "authToken": token, "permissions": permissions }))
}

/// `logoffConnection(authToken)`. Clears the token→connection mapping.
pub fn logoff_connection(ctx: &Arc<Context>, tokens: &SessionTable, params: &Value) -> Result<Value, AdminError> {
    let token = param_str(params, "authToken").ok_or(AdminError::UnknownToken)?;
    let entry = tokens.authorize(&token, 0)?;
    ctx.connection_store.remove(entry.connection_id);
    tokens.remove(&token);
    Ok(json!({}))
}

pub fn enumerate_sessions(ctx: &Arc<Context>, tokens: &SessionTable, params: &Value) -> Result<Value, AdminError> {
    let token = param_str(params, "authToken").ok_or(AdminError::UnknownToken)?;
    tokens.authorize(&token, permission::QUERY_INFORMATION)?;

    let sessions: Vec<Value> = ctx
        .session_store
        .get_all_sessions()
        .into_iter()
        .map(|s| {
            let fields = s.fields.lock().unwrap();
            json!({
                "sessionId": s.id,
                "userName": fields.user_name,
                "connectState": format!("{:?}", fields.connect_state),
            })
        })
        .collect();
    Ok(json!({ "sessions": sessions }))
}

pub fn disconnect_session(ctx: &Arc<Context>, tokens: &SessionTable, params: &Value) -> Result<Value, AdminError> {
    let token = param_str(params, "authToken").ok_or(AdminError::UnknownToken)?;
    tokens.authorize(&token, permission::DISCONNECT)?;

    let session_id = param_u32(params, "sessionId").ok_or(AdminError::SessionNotFound(0))?;
    let wait = param_bool(params, "wait", true);
    let timeout = param_timeout(params, "timeoutMs", 5000);

    let session = ctx
        .session_store
        .get_session(session_id)
        .ok_or(AdminError::SessionNotFound(session_id))?;

    let task = DisconnectTask::new(ctx.clone(), session_id, wait, timeout);
    let outcome = task.outcome.clone();
    session.executor.add_task(Box::new(task)).map_err(|_| AdminError::SessionNotFound(session_id))?;

    let success = if wait { outcome.wait(timeout + Duration::from_millis(100)).unwrap_or(false) } else { true };
    Ok(json!({ "success": success }))
}

pub fn logoff_session(ctx: &Arc<Context>, tokens: &SessionTable, params: &Value) -> Result<Value, AdminError> {
    let token = param_str(params, "authToken").ok_or(AdminError::UnknownToken)?;
    tokens.authorize(&token, permission::LOGOFF)?;

    let session_id = param_u32(params, "sessionId").ok_or(AdminError::SessionNotFound(0))?;
    let wait = param_bool(params, "wait", true);
    let timeout = param_timeout(params, "timeoutMs", 5000);

    let session = ctx
        .session_store
        .get_session(session_id)
        .ok_or(AdminError::SessionNotFound(session_id))?;

    let task = LogoffTask::new(ctx.clone(), session_id, wait, timeout);
    let outcome = task.outcome.clone();
    session.executor.add_task(Box::new(task)).map_err(|_| AdminError::SessionNotFound(session_id))?;

    let success = outcome.wait(timeout + Duration::from_millis(100)).unwrap_or(false);
    Ok(json!({ "success": success }))
}

pub fn start_remote_control_session(
    ctx: &Arc<Context>,
    tokens: &SessionTable,
    params: &Value,
) -> Result<Value, AdminError> {
    let token = param_str(params, "authToken").ok_or(AdminError::UnknownToken)?;
    tokens.authorize(&token, permission::REMOTE_CONTROL)?;

    let source_connection_id = param_u32(params, "sourceConnectionId").unwrap_or(0);
    let target_session_id = param_u32(params, "targetSessionId").ok_or(AdminError::SessionNotFound(0))?;
    let target_connection_id = param_u32(params, "targetConnectionId").unwrap_or(0);
    let hotkey_vk = param_u32(params, "hotkeyVk").unwrap_or(0);
    let hotkey_modifiers = param_u32(params, "hotkeyModifiers").unwrap_or(0);
    let flags = param_u32(params, "flags").unwrap_or(0);
    let timeout = param_timeout(params, "timeoutMs", 500);

    let session = ctx
        .session_store
        .get_session(target_session_id)
        .ok_or(AdminError::SessionNotFound(target_session_id))?;

    let task = StartRemoteControlTask::new(
        ctx.clone(),
        source_connection_id,
        target_session_id,
        target_connection_id,
        hotkey_vk,
        hotkey_modifiers,
        flags,
        timeout,
    );
    let outcome = task.outcome.clone();
    session.executor.add_task(Box::new(task)).map_err(|_| AdminError::SessionNotFound(target_session_id))?;

    let success = outcome.wait(timeout + Duration::from_millis(100)).unwrap_or(false);
    Ok(json!({ "success": success }))
}

pub fn stop_remote_control_session(
    ctx: &Arc<Context>,
    tokens: &SessionTable,
    params: &Value,
) -> Result<Value, AdminError> {
    let token = param_str(params, "authToken").ok_or(AdminError::UnknownToken)?;
    tokens.authorize(&token, permission::REMOTE_CONTROL)?;

    let session_id = param_u32(params, "sessionId").ok_or(AdminError::SessionNotFound(0))?;
    let timeout = param_timeout(params, "timeoutMs", 500);

    let session = ctx
        .session_store
        .get_session(session_id)
        .ok_or(AdminError::SessionNotFound(session_id))?;

    let task = StopRemoteControlTask::new(ctx.clone(), session_id, timeout);
    let outcome = task.outcome.clone();
    session.executor.add_task(Box::new(task)).map_err(|_| AdminError::SessionNotFound(session_id))?;

    let success = outcome.wait(timeout + Duration::from_millis(100)).unwrap_or(false);
    Ok(json!({ "success": success }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn logon_then_enumerate_requires_query_information() {
        let ctx = Context::init_for_test();
        let tokens = SessionTable::new();

        let logon = logon_connection(&ctx, &tokens, &json!({ "user": "op", "pw": "secret", "domain": "corp" })).unwrap();
        let token = logon["authToken"].as_str().unwrap().to_string();

        let result = enumerate_sessions(&ctx, &tokens, &json!({ "authToken": token }));
        assert!(result.is_ok());
    }

    #[test]
    fn enumerate_without_token_is_permission_denied() {
        let ctx = Context::init_for_test();
        let tokens = SessionTable::new();
        let result = enumerate_sessions(&ctx, &tokens, &json!({ "authToken": "bogus" }));
        assert!(matches!(result, Err(AdminError::UnknownToken)));
    }

    #[test]
    fn disconnect_missing_session_is_not_found() {
        let ctx = Context::init_for_test();
        let tokens = SessionTable::new();
        let logon = logon_connection(&ctx, &tokens, &json!({ "user": "op", "pw": "secret", "domain": "corp" })).unwrap();
        let token = logon["authToken"].as_str().unwrap().to_string();

        let result = disconnect_session(&ctx, &tokens, &json!({ "authToken": token, "sessionId": 9999 }));
        assert!(matches!(result, Err(AdminError::SessionNotFound(9999))));
    }
}
