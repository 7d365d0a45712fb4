//! The logger façade: builds an event buffer on the caller's stack frame
//! and hands it to its sink.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Once};

use crate::buffer::event::{DispatchTag, FieldValue};
use crate::buffer::EventBuffer;
use crate::level::LogLevel;
use crate::record::{Record, SourceLocation};
use crate::sink::Sink;

static RECORD_TOO_LARGE_WARNED: Once = Once::new();

fn current_thread_id() -> u64 {
  // `ThreadId` has no stable numeric conversion; hash it into a u64 so the
  // record stays a plain Copy scalar rather than borrowing the thread
  // object, matching every other record field.
  use std::hash::{Hash, Hasher};
  let mut hasher = std::collections::hash_map::DefaultHasher::new();
  std::thread::current().id().hash(&mut hasher);
  hasher.finish()
}

/// A named logger: a level threshold in front of an owned sink.
///
/// `log` never raises an error to its caller: a record that doesn't fit
/// in the 65535-byte buffer is dropped with a one-time internal warning
/// (via `tracing`), and sink-side I/O failures are the sink's problem, not
/// the logger's.
pub struct Logger {
  name: Arc<str>,
  level: AtomicU8,
  sink: Arc<dyn Sink>,
}

impl Logger {
  pub fn new(name: impl Into<Arc<str>>, level: LogLevel, sink: Arc<dyn Sink>) -> Self {
    Self {
      name: name.into(),
      level: AtomicU8::new(level as u8),
      sink,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn level(&self) -> LogLevel {
    level_from_u8(self.level.load(Ordering::Relaxed))
  }

  pub fn set_level(&self, level: LogLevel) {
    self.level.store(level as u8, Ordering::Relaxed);
  }

  pub fn is_enabled(&self, level: LogLevel) -> bool {
    level >= self.level()
  }

  /// Log one record. `fields` are written in order; `source`, when
  /// provided (typically by the `ferrilog-macros` macros), is stamped as
  /// the call site.
  pub fn log(&self, level: LogLevel, message: &str, fields: &[(&str, FieldValue<'_>)], source: Option<SourceLocation>) {
    if level < self.level() {
      return;
    }

    let mut buffer = EventBuffer::new();
    let message_offset = match buffer.write_str(message) {
      Ok(offset) => offset,
      Err(_) => {
        warn_record_too_large();
        return;
      }
    };

    for (key, value) in fields {
      if buffer.write_field(key, *value).is_err() {
        warn_record_too_large();
        return;
      }
    }

    if buffer.finalize(DispatchTag::Record).is_err() {
      warn_record_too_large();
      return;
    }

    let record = Record {
      logger: self.name.clone(),
      level,
      timestamp: chrono::Utc::now(),
      thread_id: current_thread_id(),
      source,
      message_offset,
      buffer,
    };
    self.sink.sink(record);
  }

  pub fn trace(&self, message: &str, fields: &[(&str, FieldValue<'_>)]) {
    self.log(LogLevel::Trace, message, fields, None);
  }

  pub fn debug(&self, message: &str, fields: &[(&str, FieldValue<'_>)]) {
    self.log(LogLevel::Debug, message, fields, None);
  }

  pub fn info(&self, message: &str, fields: &[(&str, FieldValue<'_>)]) {
    self.log(LogLevel::Info, message, fields, None);
  }

  pub fn warning(&self, message: &str, fields: &[(&str, FieldValue<'_>)]) {
    self.log(LogLevel::Warning, message, fields, None);
  }

  pub fn error(&self, message: &str, fields: &[(&str, FieldValue<'_>)]) {
    self.log(LogLevel::Error, message, fields, None);
  }

  pub fn flush(&self) {
    self.sink.flush();
  }
}

fn level_from_u8(byte: u8) -> LogLevel {
  match byte {
    0 => LogLevel::Trace,
    1 => LogLevel::Debug,
    2 => LogLevel::Info,
    3 => LogLevel::Warning,
    _ => LogLevel::Error,
  }
}

fn warn_record_too_large() {
  RECORD_TOO_LARGE_WARNED.call_once(|| {
    tracing::warn!("ferrilog: dropped a record that exceeded the 65535-byte event buffer limit");
  });
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::sink::MemorySink;

  #[test]
  fn below_threshold_never_reaches_sink() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new("app", LogLevel::Warning, sink.clone());

    logger.info("should be dropped", &[]);
    logger.error("should pass", &[]);

    assert_eq!(sink.len(), 1);
    assert_eq!(sink.records()[0].message(), "should pass");
  }

  #[test]
  fn set_level_takes_effect_immediately() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new("app", LogLevel::Error, sink.clone());
    logger.info("dropped", &[]);
    assert_eq!(sink.len(), 0);

    logger.set_level(LogLevel::Info);
    logger.info("kept", &[]);
    assert_eq!(sink.len(), 1);
  }
}
