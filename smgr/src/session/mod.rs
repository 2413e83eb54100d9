pub mod accessor;
pub mod connection;
pub mod executor;
pub mod session;

pub use accessor::SessionAccessor;
pub use connection::Connection;
pub use executor::{Executor, Latch, LatchResult, Task};
pub use session::{ConnectState, Session};
