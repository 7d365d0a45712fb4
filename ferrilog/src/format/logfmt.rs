//! The `logfmt`-style formatter: space-separated `key=value` pairs, with
//! any value containing a space wrapped in double quotes.

use crate::error::PatternError;
use crate::record::Record;

use super::flags::{CompiledPattern, FlagRegistry};
use super::RecordFormatter;

/// The default logfmt pattern: the standard `ts`/`lvl`/`logger`/`msg` keys
/// followed by the record's structured fields.
pub const STANDARD_PATTERN: &str = "%+%f";

/// Same flag-renderer mechanism as [`super::pattern::PatternFormatter`],
/// except any non-literal, non-field flag whose rendered text contains a
/// space gets wrapped in double quotes.
pub struct LogfmtFormatter {
  compiled: CompiledPattern,
}

impl LogfmtFormatter {
  /// Parse `pattern` with no custom flags registered.
  pub fn new(pattern: &str) -> Result<Self, PatternError> {
    Self::with_registry(pattern, &FlagRegistry::new())
  }

  pub fn with_registry(pattern: &str, registry: &FlagRegistry) -> Result<Self, PatternError> {
    Ok(Self {
      compiled: CompiledPattern::parse(pattern, registry)?,
    })
  }

  /// `ts=... lvl=... logger=... msg=...` followed by fields — the
  /// out-of-the-box logfmt line.
  pub fn standard() -> Self {
    Self::new(STANDARD_PATTERN).expect("standard pattern is always valid")
  }
}

impl RecordFormatter for LogfmtFormatter {
  fn format(&self, record: &Record, out: &mut String) {
    self.compiled.format(record, true, out);
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::buffer::event::{DispatchTag, EventBuffer, FieldValue};
  use crate::level::LogLevel;
  use crate::record::Record;
  use std::sync::Arc;

  #[test]
  fn logfmt_with_fields_matches_scenario() {
    let formatter = LogfmtFormatter::new("msg=%v%f").unwrap();
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str("Test message").unwrap();
    buffer.write_field("test_name", FieldValue::Str("should_format_fields")).unwrap();
    buffer.write_field("test_success", FieldValue::Bool(true)).unwrap();
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
    assert_eq!(
      out,
      "msg=\"Test message\" test_name=should_format_fields test_success=true"
    );
  }

  #[test]
  fn standard_pattern_includes_default_keys() {
    let formatter = LogfmtFormatter::standard();
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str("hello").unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    let record = Record {
      logger: Arc::from("app.net"),
      level: LogLevel::Warning,
      timestamp: chrono::Utc::now(),
      thread_id: 9,
      source: None,
      message_offset,
      buffer,
    };

    let mut out = String::new();
    formatter.format(&record, &mut out);
    assert!(out.starts_with("ts="));
    assert!(out.contains("lvl=Warn"));
    assert!(out.contains("logger=app.net"));
    assert!(out.contains("msg=hello"));
  }
}
