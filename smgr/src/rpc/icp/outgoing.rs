//! Outgoing ICP queue (§4.3, §5): a signaling multi-producer/single-consumer
//! queue. Decoded `CallIn` responses and synthesized `CallOut` requests are
//! appended here; the ICP writer thread drains and frames them.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use icp_proto::frame::Frame;

pub struct OutgoingQueue {
    sender: Sender<Frame>,
    receiver: Mutex<Option<Receiver<Frame>>>,
}

impl Default for OutgoingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OutgoingQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    pub fn push(&self, frame: Frame) {
        let _ = self.sender.send(frame);
    }

    /// Takes ownership of the receiving half for the writer thread. Only
    /// one consumer is ever expected; returns `None` if already taken.
    pub fn take_receiver(&self) -> Option<Receiver<Frame>> {
        self.receiver.lock().unwrap().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_frames_drain_in_fifo_order() {
        let queue = OutgoingQueue::new();
        queue.push(Frame { call_type: 1, tag: 1, direction: 1, status: 0, payload: vec![] });
        queue.push(Frame { call_type: 2, tag: 2, direction: 1, status: 0, payload: vec![] });

        let receiver = queue.take_receiver().unwrap();
        assert_eq!(receiver.recv().unwrap().tag, 1);
        assert_eq!(receiver.recv().unwrap().tag, 2);
    }

    #[test]
    fn receiver_can_only_be_taken_once() {
        let queue = OutgoingQueue::new();
        assert!(queue.take_receiver().is_some());
        assert!(queue.take_receiver().is_none());
    }
}
