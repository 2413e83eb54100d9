pub mod call_in;
pub mod call_out;
pub mod dispatcher;
pub mod listener;
pub mod outgoing;
pub mod reader;
pub mod writer;

pub use call_in::CallInHandler;
pub use call_out::{PendingCallOuts, CallOutWait};
pub use dispatcher::Dispatcher;
pub use outgoing::OutgoingQueue;
