//! A sink wrapper that hands each record to a [`Poller`] queue instead of
//! formatting it on the caller's thread.

use std::sync::Arc;

use crate::record::Record;
use crate::transport::poller::QueueHandle;
use crate::transport::Poller;

use super::Sink;

/// On `sink(record)`, pushes the record onto its queue and returns; the
/// poller's dedicated thread later pops it and invokes the inner sink this
/// queue was registered with.
pub struct AsyncSink {
  poller: Arc<Poller>,
  handle: QueueHandle,
}

impl AsyncSink {
  /// `inner` is the sink that actually formats/persists each record;
  /// `capacity` bounds the queue (rounded up to a power of two).
  pub fn new(poller: Arc<Poller>, capacity: usize, inner: Arc<dyn Sink>) -> Self {
    let handle = poller.add_queue(capacity, inner);
    Self { poller, handle }
  }
}

impl Sink for AsyncSink {
  fn sink(&self, record: Record) {
    self.handle.push(record);
  }
}

impl AsyncSink {
  /// The poller this sink's queue is registered with, e.g. to call
  /// `poller.stop()` during shutdown before this sink is dropped.
  pub fn poller(&self) -> &Arc<Poller> {
    &self.poller
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::buffer::event::{DispatchTag, EventBuffer};
  use crate::level::LogLevel;
  use crate::sink::MemorySink;

  fn make_record() -> Record {
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str("x").unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    Record {
      logger: std::sync::Arc::from("t"),
      level: LogLevel::Info,
      timestamp: chrono::Utc::now(),
      thread_id: 0,
      source: None,
      message_offset,
      buffer,
    }
  }

  #[test]
  fn async_sink_forwards_through_poller() {
    let poller = Poller::new();
    let memory = Arc::new(MemorySink::new());
    let async_sink = AsyncSink::new(poller.clone(), 1024, memory.clone());

    for _ in 0..1_000_000u32 {
      async_sink.sink(make_record());
    }
    poller.stop();

    assert_eq!(memory.len(), 1_000_000);
  }
}
