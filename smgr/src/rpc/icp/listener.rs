//! ICP Unix domain socket listener (§5): one blocking accept loop per
//! process. Each accepted frontend connection gets its own reader/writer
//! thread pair, matching the OS-thread-per-session execution model rather
//! than a cooperative reactor.

use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixListener;
use std::sync::Arc;

use icp_proto::call_type::CallType;
use prost::Message;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::context::Context;

use super::{reader, writer};

/// Maps an inbound request frame to the session it targets. `LogonUser`
/// has no session yet (0, the handler creates one); property lookups
/// resolve their own session from the connection id inside `do_work`
/// rather than here, since this mapping has no store access.
fn resolve_session_id(call_type: u32, payload: &[u8]) -> u32 {
    match CallType::from_u32(call_type) {
        Some(CallType::SbpEndSession) => icp_proto::EndSessionRequest::decode(payload)
            .map(|r| r.sessionid)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Binds `config.icp_socket_path`, removing any stale socket file left by a
/// previous run, and blocks accepting connections until the process exits.
/// Only the first accepted connection gets a writer thread: the outgoing
/// queue's receiver can be taken once (§5).
pub fn run(ctx: Arc<Context>, config: Config) -> std::io::Result<()> {
    let socket_path = &config.icp_socket_path;
    let _ = std::fs::remove_file(socket_path);
    if let Some(parent) = socket_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let listener = UnixListener::bind(socket_path)?;
    std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o700))?;
    info!("Listening on socket: {}", socket_path.display());

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                error!(%err, "ICP listener: failed to accept connection");
                continue;
            }
        };

        let reader_stream = match stream.try_clone() {
            Ok(s) => s,
            Err(err) => {
                error!(%err, "ICP listener: failed to clone accepted stream");
                continue;
            }
        };

        match ctx.outgoing.take_receiver() {
            Some(receiver) => {
                writer::spawn(stream, receiver);
            }
            None => {
                warn!("ICP listener: outgoing queue already has a writer, new connection is read-only");
            }
        }
        reader::spawn(ctx.clone(), reader_stream, resolve_session_id);
    }

    Ok(())
}
