//! A memory-capturing sink, for tests and for scenarios that want to
//! inspect records after the fact rather than render them to an output.

use std::sync::Mutex;

use crate::record::Record;

use super::Sink;

/// Captures every record it receives, in arrival order. Used by the
/// testable-properties suite (e.g. "the inner sink observes exactly N
/// records, in push order") and by anything that wraps this sink in an
/// [`super::AsyncSink`] to observe poller dispatch order.
#[derive(Default)]
pub struct MemorySink {
  records: Mutex<Vec<Record>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.records.lock().unwrap().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// A snapshot of every record received so far, in arrival order.
  pub fn records(&self) -> Vec<Record> {
    self.records.lock().unwrap().clone()
  }

  pub fn clear(&self) {
    self.records.lock().unwrap().clear();
  }
}

impl Sink for MemorySink {
  fn sink(&self, record: Record) {
    self.records.lock().unwrap().push(record);
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::buffer::event::{DispatchTag, EventBuffer};
  use crate::level::LogLevel;
  use std::sync::Arc;

  fn make_record(message: &str) -> Record {
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str(message).unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    Record {
      logger: Arc::from("t"),
      level: LogLevel::Info,
      timestamp: chrono::Utc::now(),
      thread_id: 0,
      source: None,
      message_offset,
      buffer,
    }
  }

  #[test]
  fn captures_records_in_order() {
    let sink = MemorySink::new();
    sink.sink(make_record("one"));
    sink.sink(make_record("two"));
    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message(), "one");
    assert_eq!(records[1].message(), "two");
  }
}
