//! Administrative API acceptor (§4.3, §5): a TLS-secured, length-prefixed
//! JSON request/response protocol. One acceptor task, one worker task per
//! accepted connection (I/O-bound; the mutation itself runs on the
//! target session's own executor thread).

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use icp_proto::admin::{errors, AdminErrorResponse, AdminReply, AdminRequest, AdminResponse};

use crate::config::Config;
use crate::context::Context;
use crate::error::AdminError;

use super::auth::SessionTable;
use super::methods;

const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

fn admin_error_code(err: &AdminError) -> i64 {
    match err {
        AdminError::PermissionDenied(_) => errors::PERMISSION_DENIED,
        AdminError::UnknownToken => errors::PERMISSION_DENIED,
        AdminError::SessionNotFound(_) => errors::NOT_FOUND,
    }
}

async fn read_message<S: AsyncRead + Unpin>(stream: &mut S) -> std::io::Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "message too large"));
    }
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}

async fn write_message<S: AsyncWrite + Unpin>(stream: &mut S, bytes: &[u8]) -> std::io::Result<()> {
    stream.write_all(&(bytes.len() as u32).to_be_bytes()).await?;
    stream.write_all(bytes).await?;
    stream.flush().await
}

async fn handle_connection<S: AsyncRead + AsyncWrite + Unpin>(
    ctx: Arc<Context>,
    tokens: Arc<SessionTable>,
    mut stream: S,
) {
    loop {
        let bytes = match read_message(&mut stream).await {
            Ok(bytes) => bytes,
            Err(_) => return,
        };

        let request: AdminRequest = match serde_json::from_slice(&bytes) {
            Ok(req) => req,
            Err(err) => {
                let reply = AdminReply::Err(AdminErrorResponse::new(errors::PARSE_ERROR, err.to_string()));
                let encoded = serde_json::to_vec(&reply).unwrap_or_default();
                let _ = write_message(&mut stream, &encoded).await;
                continue;
            }
        };

        let result = dispatch(&ctx, &tokens, &request).await;
        let reply = match result {
            Ok(value) => AdminReply::Ok(AdminResponse::new(value)),
            Err(err) => {
                warn!(method = %request.method, %err, "admin call rejected");
                AdminReply::Err(AdminErrorResponse::new(admin_error_code(&err), err.to_string()))
            }
        };

        let encoded = match serde_json::to_vec(&reply) {
            Ok(bytes) => bytes,
            Err(_) => return,
        };
        if write_message(&mut stream, &encoded).await.is_err() {
            return;
        }
    }
}

async fn dispatch(
    ctx: &Arc<Context>,
    tokens: &Arc<SessionTable>,
    request: &AdminRequest,
) -> Result<serde_json::Value, AdminError> {
    match request.method.as_str() {
        "logonConnection" => methods::logon_connection(ctx, tokens, &request.params),
        "logoffConnection" => methods::logoff_connection(ctx, tokens, &request.params),
        "enumerateSessions" => methods::enumerate_sessions(ctx, tokens, &request.params),
        "disconnectSession" => methods::disconnect_session(ctx, tokens, &request.params),
        "logoffSession" => methods::logoff_session(ctx, tokens, &request.params),
        "startRemoteControlSession" => methods::start_remote_control_session(ctx, tokens, &request.params),
        "stopRemoteControlSession" => methods::stop_remote_control_session(ctx, tokens, &request.params),
        _ => Err(AdminError::UnknownToken),
    }
}

/// Runs the Administrative API acceptor loop. If TLS material is
/// configured it terminates TLS per connection; otherwise (e.g. local
/// testing) it serves plaintext, logged at WARN.
pub async fn run(ctx: Arc<Context>, config: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.admin_listen_addr).await?;
    info!(addr = %config.admin_listen_addr, "admin API listening");

    let tokens = Arc::new(SessionTable::new());

    let acceptor = match (&config.admin_tls_cert, &config.admin_tls_key) {
        (Some(cert), Some(key)) => {
            let server_config = super::tls::load_server_config(cert, key)?;
            Some(TlsAcceptor::from(Arc::new(server_config)))
        }
        _ => {
            warn!("admin API TLS material not configured, serving plaintext");
            None
        }
    };

    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "admin API connection accepted");
        let ctx = ctx.clone();
        let tokens = tokens.clone();

        match &acceptor {
            Some(acceptor) => {
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    match acceptor.accept(stream).await {
                        Ok(tls_stream) => handle_connection(ctx, tokens, tls_stream).await,
                        Err(err) => warn!(%err, "TLS handshake failed"),
                    }
                });
            }
            None => {
                tokio::spawn(handle_connection(ctx, tokens, stream));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::duplex;

    #[tokio::test]
    async fn logon_then_enumerate_round_trips_over_the_wire() {
        let ctx = Context::init_for_test();
        let tokens = Arc::new(SessionTable::new());
        let (mut client, server) = duplex(4096);
        tokio::spawn(handle_connection(ctx, tokens, server));

        let logon = AdminRequest {
            method: "logonConnection".into(),
            params: json!({ "user": "op", "pw": "secret", "domain": "corp" }),
        };
        write_message(&mut client, &serde_json::to_vec(&logon).unwrap()).await.unwrap();
        let resp_bytes = read_message(&mut client).await.unwrap();
        let reply: AdminReply = serde_json::from_slice(&resp_bytes).unwrap();
        let token = match reply {
            AdminReply::Ok(resp) => resp.result["authToken"].as_str().unwrap().to_string(),
            AdminReply::Err(e) => panic!("unexpected error: {:?}", e),
        };

        let enumerate = AdminRequest {
            method: "enumerateSessions".into(),
            params: json!({ "authToken": token }),
        };
        write_message(&mut client, &serde_json::to_vec(&enumerate).unwrap()).await.unwrap();
        let resp_bytes = read_message(&mut client).await.unwrap();
        let reply: AdminReply = serde_json::from_slice(&resp_bytes).unwrap();
        assert!(matches!(reply, AdminReply::Ok(_)));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let ctx = Context::init_for_test();
        let tokens = Arc::new(SessionTable::new());
        let (mut client, server) = duplex(4096);
        tokio::spawn(handle_connection(ctx, tokens, server));

        let req = AdminRequest { method: "doesNotExist".into(), params: json!({}) };
        write_message(&mut client, &serde_json::to_vec(&req).unwrap()).await.unwrap();
        let resp_bytes = read_message(&mut client).await.unwrap();
        let reply: AdminReply = serde_json::from_slice(&resp_bytes).unwrap();
        assert!(matches!(reply, AdminReply::Err(_)));
    }
}
