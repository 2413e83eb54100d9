//! Per-session executor (§4.2), grounded on
//! `original_source/session-manager/common/task/{InformableTask.h,
//! ThreadTask.h}` and `common/utils/SignalingQueue.h`.
//!
//! One real OS thread per live [`super::session::Session`], draining an
//! MPSC inbox in FIFO order — not a tokio task, per §5's "parallel
//! threads, not cooperative".

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// A unit of work run on a session's executor thread.
pub trait Task: Send {
    fn run(&mut self);

    /// Invoked instead of `run` when the executor is stopped without
    /// draining (`stop(false)`); opens the task's latch in the aborted
    /// state by default.
    fn abort(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchResult {
    Signalled,
    Aborted,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    Unset,
    Signalled,
    Aborted,
}

/// Auto-reset completion event — the Rust shape of a Win32 `HANDLE` plus
/// `WaitForSingleObject(timeout)`, per §9's REDESIGN FLAGS.
pub struct Latch {
    state: Mutex<LatchState>,
    cond: Condvar,
}

impl Latch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LatchState::Unset),
            cond: Condvar::new(),
        })
    }

    pub fn signal(&self) {
        let mut state = self.state.lock().unwrap();
        *state = LatchState::Signalled;
        self.cond.notify_all();
    }

    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap();
        *state = LatchState::Aborted;
        self.cond.notify_all();
    }

    pub fn wait_timeout(&self, timeout: Duration) -> LatchResult {
        let mut state = self.state.lock().unwrap();
        loop {
            match *state {
                LatchState::Signalled => return LatchResult::Signalled,
                LatchState::Aborted => return LatchResult::Aborted,
                LatchState::Unset => {
                    let (guard, wait_result) = self.cond.wait_timeout(state, timeout).unwrap();
                    state = guard;
                    if wait_result.timed_out() && *state == LatchState::Unset {
                        return LatchResult::TimedOut;
                    }
                }
            }
        }
    }
}

enum Job {
    Run(Box<dyn Task>),
    Stop { drain: bool },
}

pub struct Executor {
    session_id: u32,
    sender: Sender<Job>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Executor {
    pub fn spawn(session_id: u32) -> Self {
        let (tx, rx): (Sender<Job>, Receiver<Job>) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name(format!("smgr-session-{session_id}"))
            .spawn(move || Self::run_loop(rx))
            .expect("failed to spawn session executor thread");

        Self {
            session_id,
            sender: tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    fn run_loop(rx: Receiver<Job>) {
        for job in rx.iter() {
            match job {
                Job::Run(mut task) => task.run(),
                Job::Stop { drain } => {
                    if !drain {
                        // Drain remaining queued tasks, aborting each —
                        // mirrors stopExecutorThread(false).
                        while let Ok(Job::Run(mut task)) = rx.try_recv() {
                            task.abort();
                        }
                    }
                    return;
                }
            }
        }
    }

    /// Enqueue a task. Fails with `Err(())` (`ShutdownInProgress`, per §7)
    /// if the executor has already been asked to stop.
    pub fn add_task(&self, task: Box<dyn Task>) -> Result<(), ()> {
        self.sender.send(Job::Run(task)).map_err(|_| ())
    }

    /// Signal shutdown. `drain=true` finishes queued tasks first;
    /// `drain=false` aborts each queued task. Joins the thread before
    /// returning, per §4.2's "no task for a session runs after
    /// stopExecutorThread completes and the thread is joined".
    pub fn stop(&self, drain: bool) {
        self.signal_stop(drain);
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    /// Enqueues the stop signal without joining. Used by a task running
    /// *on* this executor's own thread to request self-termination —
    /// joining from inside would deadlock, so the thread simply picks up
    /// the `Stop` job on its next loop iteration and exits on its own.
    pub fn signal_stop(&self, drain: bool) {
        let _ = self.sender.send(Job::Stop { drain });
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Increment {
        counter: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<usize>>>,
        tag: usize,
        delay: Duration,
    }

    impl Task for Increment {
        fn run(&mut self) {
            std::thread::sleep(self.delay);
            self.counter.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.tag);
        }
    }

    #[test]
    fn tasks_run_in_fifo_order_one_at_a_time() {
        let executor = Executor::spawn(1);
        let counter = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            executor
                .add_task(Box::new(Increment {
                    counter: counter.clone(),
                    order: order.clone(),
                    tag: i,
                    delay: Duration::from_millis(1),
                }))
                .unwrap();
        }
        executor.stop(true);

        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    struct Recording {
        latch: Arc<Latch>,
    }

    impl Task for Recording {
        fn run(&mut self) {
            self.latch.signal();
        }

        fn abort(&mut self) {
            self.latch.abort();
        }
    }

    #[test]
    fn stop_without_drain_aborts_queued_tasks() {
        let executor = Executor::spawn(2);
        let latch = Latch::new();
        executor.add_task(Box::new(Recording { latch: latch.clone() })).unwrap();
        executor.stop(false);

        // Either ran before the stop signal landed (Signalled) or was
        // aborted — never left Unset.
        let result = latch.wait_timeout(Duration::from_millis(50));
        assert_ne!(result, LatchResult::TimedOut);
    }

    #[test]
    fn add_task_after_stop_fails() {
        let executor = Executor::spawn(3);
        executor.stop(true);
        let latch = Latch::new();
        let result = executor.add_task(Box::new(Recording { latch }));
        assert!(result.is_err());
    }

    #[test]
    fn latch_wait_times_out_when_never_signalled() {
        let latch = Latch::new();
        let result = latch.wait_timeout(Duration::from_millis(20));
        assert_eq!(result, LatchResult::TimedOut);
    }
}
