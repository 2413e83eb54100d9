//! Outbound `CallOut` bookkeeping (§4.3): the manager synthesizes a
//! request with a fresh tag, appends it to the outgoing queue, and parks
//! a latch; the reader thread, on seeing the matching tag on the reply
//! sub-stream, decodes the response and opens the latch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use icp_proto::frame::Frame;

use crate::session::{Latch, LatchResult};

static NEXT_TAG: AtomicU32 = AtomicU32::new(1);

pub fn next_tag() -> u32 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

struct Pending {
    latch: Arc<Latch>,
    response: Mutex<Option<Frame>>,
}

/// Outcome of waiting for a `CallOut`'s response.
pub enum CallOutWait {
    Response(Frame),
    Timeout,
    Aborted,
}

/// Table of in-flight outbound calls, keyed by tag. Owned by the
/// [`crate::context::Context`] and shared between whoever issues a
/// `CallOut` and the ICP reader thread that resolves it.
#[derive(Default)]
pub struct PendingCallOuts {
    table: Mutex<HashMap<u32, Arc<Pending>>>,
}

impl PendingCallOuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending call for `tag`, returning the latch to
    /// wait on.
    pub fn register(&self, tag: u32) -> Arc<Latch> {
        let pending = Arc::new(Pending {
            latch: Latch::new(),
            response: Mutex::new(None),
        });
        let latch = pending.latch.clone();
        self.table.lock().unwrap().insert(tag, pending);
        latch
    }

    /// Called by the ICP reader thread when a response frame with a
    /// matching tag arrives on the reply sub-stream.
    pub fn resolve(&self, tag: u32, frame: Frame) {
        if let Some(pending) = self.table.lock().unwrap().get(&tag) {
            *pending.response.lock().unwrap() = Some(frame);
            pending.latch.signal();
        }
        // No matching entry: a stale or duplicate reply, dropped per §7's
        // "the CallOut object lingers until ... discarded".
    }

    /// Blocks up to `timeout` for `tag`'s response, then removes the
    /// entry regardless of outcome (§7: "lingers until the response
    /// arrives, and is discarded, or the dispatcher is torn down").
    pub fn wait(&self, tag: u32, timeout: Duration) -> CallOutWait {
        let pending = match self.table.lock().unwrap().get(&tag).cloned() {
            Some(p) => p,
            None => return CallOutWait::Timeout,
        };
        let result = pending.latch.wait_timeout(timeout);
        self.table.lock().unwrap().remove(&tag);
        match result {
            LatchResult::Signalled => pending
                .response
                .lock()
                .unwrap()
                .take()
                .map(CallOutWait::Response)
                .unwrap_or(CallOutWait::Timeout),
            LatchResult::Aborted => CallOutWait::Aborted,
            LatchResult::TimedOut => CallOutWait::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn resolve_before_wait_is_observed() {
        let table = PendingCallOuts::new();
        let tag = next_tag();
        table.register(tag);
        table.resolve(
            tag,
            Frame { call_type: 5, tag, direction: 1, status: 0, payload: vec![1, 2, 3] },
        );

        match table.wait(tag, Duration::from_millis(100)) {
            CallOutWait::Response(frame) => assert_eq!(frame.payload, vec![1, 2, 3]),
            _ => panic!("expected a response"),
        }
    }

    #[test]
    fn wait_times_out_when_nothing_resolves() {
        let table = PendingCallOuts::new();
        let tag = next_tag();
        table.register(tag);
        match table.wait(tag, Duration::from_millis(20)) {
            CallOutWait::Timeout => {}
            _ => panic!("expected a timeout"),
        }
    }

    #[test]
    fn resolve_from_another_thread_unblocks_wait() {
        let table = Arc::new(PendingCallOuts::new());
        let tag = next_tag();
        table.register(tag);

        let table2 = table.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            table2.resolve(
                tag,
                Frame { call_type: 1, tag, direction: 1, status: 0, payload: vec![] },
            );
        });

        match table.wait(tag, Duration::from_millis(500)) {
            CallOutWait::Response(_) => {}
            _ => panic!("expected a response"),
        }
        handle.join().unwrap();
    }

    #[test]
    fn unmatched_resolve_is_silently_dropped() {
        let table = PendingCallOuts::new();
        table.resolve(999, Frame { call_type: 1, tag: 999, direction: 1, status: 0, payload: vec![] });
    }
}
