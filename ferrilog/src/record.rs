//! The sink record: everything a sink needs to format and persist one
//! logging call, aside from the structured fields (which live inside the
//! [`EventBuffer`]).
//!
//! Timestamp, thread id and source location are plain fixed-size fields
//! here rather than offsets into the buffer's data region: unlike the
//! fields block, nothing needs to address them by offset, so there is no
//! reason to pay for the indirection. The message text *is* written
//! through the buffer (`write_str`), since it is exactly the kind of
//! variable-length payload the buffer exists to hold without allocating
//! twice.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::buffer::{EventBuffer, StringOffset};
use crate::level::LogLevel;

/// Call-site location, supplied by the `ferrilog-macros` logging macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
  pub file: &'static str,
  pub line: u32,
}

/// One finished log record, as handed from a [`crate::logger::Logger`] to
/// a [`crate::sink::Sink`].
///
/// `logger` is an `Arc<str>` rather than a borrowed `&str`: the spec's
/// reference design keeps a raw borrow whose lifetime is upheld only by a
/// documented invariant (the registry outlives the poller). `Arc<str>` is
/// the safe-Rust equivalent of that invariant — cheap to clone into a queue
/// slot, no unsafe lifetime extension required to cross the thread
/// boundary into the poller.
#[derive(Debug, Clone)]
pub struct Record {
  pub logger: Arc<str>,
  pub level: LogLevel,
  pub timestamp: DateTime<Utc>,
  pub thread_id: u64,
  pub source: Option<SourceLocation>,
  pub(crate) message_offset: StringOffset,
  pub buffer: EventBuffer,
}

impl Record {
  /// The message text written at construction time.
  pub fn message(&self) -> &str {
    self
      .buffer
      .read_string(self.message_offset)
      .expect("message offset always points at the string this record wrote")
  }
}
