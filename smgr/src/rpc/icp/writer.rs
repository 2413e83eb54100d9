//! ICP writer thread (§5): drains the outgoing queue and frames each
//! response/request back to the frontend.

use std::io::Write;
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;

use icp_proto::frame::{write_frame, Frame};
use tracing::error;

pub fn spawn<W>(mut stream: W, receiver: Receiver<Frame>) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    std::thread::Builder::new()
        .name("smgr-icp-writer".into())
        .spawn(move || {
            for frame in receiver.iter() {
                if let Err(err) = write_frame(&mut stream, &frame) {
                    error!(%err, "ICP writer: failed to write frame, stopping");
                    return;
                }
            }
        })
        .expect("failed to spawn ICP writer thread")
}
