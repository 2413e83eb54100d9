//! `CallIn LogonUser` (§4.4), grounded on
//! `original_source/session-manager/common/call/TaskCallInLogonUser.cpp`:
//! the simplest possible call body — run `doStuff` (authenticate, create
//! the `Session` on success), then hand the response straight to the
//! outgoing queue. No executor is involved since no `Session` exists yet
//! to bind one to.

use prost::Message;

use icp_proto::call_type::CallType;

use crate::context::Context;
use crate::notification::NotificationType;
use crate::permission::PRESET_USER;
use crate::rpc::icp::call_in::{CallInHandler, DecodeError};
use crate::session::{ConnectState, SessionAccessor};

pub struct LogonUserCallIn {
    connection_id: u32,
    username: String,
    domain: String,
    password: String,
    client_host_name: String,
    session_id: u32,
    success: bool,
}

impl LogonUserCallIn {
    pub fn new() -> Self {
        Self {
            connection_id: 0,
            username: String::new(),
            domain: String::new(),
            password: String::new(),
            client_host_name: String::new(),
            session_id: 0,
            success: false,
        }
    }
}

impl Default for LogonUserCallIn {
    fn default() -> Self {
        Self::new()
    }
}

impl CallInHandler for LogonUserCallIn {
    fn decode_request(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let req = icp_proto::LogonUserRequest::decode(bytes)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        self.connection_id = req.connectionid;
        self.username = req.username;
        self.domain = req.domain;
        self.password = req.password;
        self.client_host_name = req.clienthostname;
        Ok(())
    }

    fn prepare(&mut self, _ctx: &Context) -> bool {
        true
    }

    fn do_work(&mut self, ctx: &Context) {
        match ctx.auth_provider.authenticate(&self.username, &self.domain, &self.password) {
            Some(token) => {
                let session = ctx.session_store.create();
                {
                    let accessor = SessionAccessor::bind(&session);
                    accessor.generate_user_token(token.clone());
                    accessor.set_permissions(PRESET_USER);
                    accessor.set_connect_state(ConnectState::Connected);
                }
                {
                    let mut fields = session.fields.lock().unwrap();
                    fields.user_name = self.username.clone();
                    fields.domain = self.domain.clone();
                    fields.client_host_name = self.client_host_name.clone();
                }
                ctx.connection_store.create(session.id, token, PRESET_USER);
                self.session_id = session.id;
                self.success = true;
                ctx.notifications.emit(NotificationType::SessionCreate, session.id);
                ctx.notifications.emit(NotificationType::SessionLogon, session.id);
            }
            None => {
                self.success = false;
            }
        }
    }

    fn encode_response(&self) -> Vec<u8> {
        icp_proto::LogonUserResponse { success: self.success, sessionid: self.session_id }
            .encode_to_vec()
    }

    fn call_type(&self) -> CallType {
        CallType::LogonUser
    }
}
