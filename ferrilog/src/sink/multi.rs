//! A fan-out sink wrapper: one record, many destinations.

use std::sync::Arc;

use crate::record::Record;

use super::Sink;

/// Forwards every record to each wrapped sink. The record is cloned once
/// per extra destination; the last sink in the list receives the original
/// to avoid one redundant clone.
pub struct MultiSink {
  sinks: Vec<Arc<dyn Sink>>,
}

impl MultiSink {
  pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
    Self { sinks }
  }
}

impl Sink for MultiSink {
  fn sink(&self, record: Record) {
    let Some((last, rest)) = self.sinks.split_last() else {
      return;
    };
    for sink in rest {
      sink.sink(record.clone());
    }
    last.sink(record);
  }

  fn flush(&self) {
    for sink in &self.sinks {
      sink.flush();
    }
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
  fn forwards_to_every_sink() {
    let a = Arc::new(MemorySink::new());
    let b = Arc::new(MemorySink::new());
    let multi = MultiSink::new(vec![a.clone(), b.clone()]);

    multi.sink(make_record());

    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
  }
}
