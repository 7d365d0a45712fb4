//! The human-readable pattern formatter.

use crate::error::PatternError;
use crate::record::Record;

use super::flags::{CompiledPattern, FlagRegistry};
use super::RecordFormatter;

/// Renders a record through a user-supplied `%`-directive template,
/// verbatim: no value is ever quoted, regardless of whether it contains a
/// space. See [`super::logfmt::LogfmtFormatter`] for the quoting flavor.
pub struct PatternFormatter {
  compiled: CompiledPattern,
}

impl PatternFormatter {
  /// Parse `pattern` with no custom flags registered.
  pub fn new(pattern: &str) -> Result<Self, PatternError> {
    Self::with_registry(pattern, &FlagRegistry::new())
  }

  /// Parse `pattern`, resolving any custom flag characters against
  /// `registry`. Registration must happen before this call — parsing
  /// happens once, up front.
  pub fn with_registry(pattern: &str, registry: &FlagRegistry) -> Result<Self, PatternError> {
    Ok(Self {
      compiled: CompiledPattern::parse(pattern, registry)?,
    })
  }
}

impl RecordFormatter for PatternFormatter {
  fn format(&self, record: &Record, out: &mut String) {
    self.compiled.format(record, false, out);
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::buffer::event::{DispatchTag, EventBuffer, FieldValue};
  use crate::level::LogLevel;
  use crate::record::Record;
  use chrono::TimeZone;
  use std::sync::Arc;

  fn record_at(timestamp: chrono::DateTime<chrono::Utc>, logger: &str, level: LogLevel, message: &str) -> Record {
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str(message).unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    Record {
      logger: Arc::from(logger),
      level,
      timestamp,
      thread_id: 7,
      source: None,
      message_offset,
      buffer,
    }
  }

  #[test]
  fn basic_pattern_matches_scenario() {
    let formatter = PatternFormatter::new("%Y-%m-%d %H:%M:%S [%l] (%n) %v").unwrap();
    let ts = chrono::Utc.with_ymd_and_hms(2021, 1, 8, 15, 20, 10).unwrap();
    let record = record_at(ts, "MyLogger", LogLevel::Info, "Test result: Pass (0)");

    let mut out = String::new();
    formatter.format(&record, &mut out);
    assert_eq!(out, "2021-01-08 15:20:10 [Info] (MyLogger) Test result: Pass (0)");
  }

  #[test]
  fn trailing_percent_is_a_parse_error() {
    let err = PatternFormatter::new("hello%").unwrap_err();
    assert_eq!(err.column, 6);
  }

  #[test]
  fn unknown_flag_is_a_parse_error() {
    let err = PatternFormatter::new("%Q").unwrap_err();
    assert_eq!(err.column, 1);
  }

  #[test]
  fn fields_block_renders_logfmt_regardless_of_flavor() {
    let formatter = PatternFormatter::new("%v%f").unwrap();
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str("hi").unwrap();
    buffer.write_field("a", FieldValue::Str("has space")).unwrap();
    buffer.write_field("b", FieldValue::U32(3)).unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    let record = Record {
      logger: Arc::from("l"),
      level: LogLevel::Info,
      timestamp: chrono::Utc::now(),
      thread_id: 1,
      source: None,
      message_offset,
      buffer,
    };

    let mut out = String::new();
    formatter.format(&record, &mut out);
    assert_eq!(out, "hi a=\"has space\" b=3");
  }
}
