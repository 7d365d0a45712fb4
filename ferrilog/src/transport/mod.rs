//! The async transport: a bounded MPSC ring buffer and a dedicated poller
//! thread that drains registered queues and dispatches to sinks.

pub mod poller;
pub mod queue;

pub use poller::Poller;
pub use queue::RingBuffer;
