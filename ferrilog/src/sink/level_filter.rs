//! A sink wrapper adding a level threshold in front of an inner sink.

use std::sync::Arc;

use crate::level::LogLevel;
use crate::record::Record;

use super::Sink;

/// Drops any record below `threshold` before it reaches `inner`.
///
/// This exists alongside `Logger`'s own level check because a logger's
/// sink is often a [`super::MultiSink`] fan-out where different branches
/// want different thresholds — the logger-level check alone can't express
/// "send warnings and up to the console, everything to the file".
pub struct LevelFilterSink {
  threshold: LogLevel,
  inner: Arc<dyn Sink>,
}

impl LevelFilterSink {
  pub fn new(threshold: LogLevel, inner: Arc<dyn Sink>) -> Self {
    Self { threshold, inner }
  }
}

impl Sink for LevelFilterSink {
  fn sink(&self, record: Record) {
    if record.level < self.threshold {
      return;
    }
    self.inner.sink(record);
  }

  fn flush(&self) {
    self.inner.flush();
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::buffer::event::{DispatchTag, EventBuffer};
  use crate::sink::MemorySink;

  fn make_record(level: LogLevel) -> Record {
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str("x").unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    Record {
      logger: std::sync::Arc::from("t"),
      level,
      timestamp: chrono::Utc::now(),
      thread_id: 0,
      source: None,
      message_offset,
      buffer,
    }
  }

  #[test]
  fn drops_below_threshold() {
    let inner = Arc::new(MemorySink::new());
    let filter = LevelFilterSink::new(LogLevel::Warning, inner.clone());

    filter.sink(make_record(LogLevel::Debug));
    filter.sink(make_record(LogLevel::Info));
    filter.sink(make_record(LogLevel::Error));

    assert_eq!(inner.len(), 1);
  }
}
