//! Crate-wide error taxonomy.
//!
//! Producer-side errors never reach the caller of `Logger::log`; they are
//! counted internally and reported through `tracing`. Configuration and
//! formatter-construction errors are raised directly to their caller.

use thiserror::Error;

/// A parsed record exceeded the event buffer's 65535-byte limit.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("record too large: buffer would grow to {attempted} bytes, limit is {limit}")]
pub struct RecordTooLarge {
  pub attempted: usize,
  pub limit: usize,
}

/// An offset read past the live data region. Only reachable through
/// deliberately corrupted buffers in tests and fuzzing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("corrupt record: offset {offset} out of range for a region of {region_len} bytes")]
pub struct CorruptRecord {
  pub offset: u16,
  pub region_len: usize,
}

/// A malformed pattern passed to [`crate::format::pattern::PatternFormatter`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("pattern error at column {column}: {description}")]
pub struct PatternError {
  pub column: usize,
  pub description: String,
}

/// A source region inside a parsed configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRegion {
  pub line: usize,
  pub column: usize,
}

/// Malformed TOML configuration, fatal to `config::configure`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("config error at {region:?}: {description}")]
pub struct ConfigError {
  pub description: String,
  pub region: SourceRegion,
}

/// Surfaced only if a caller opts into a non-blocking push variant; the
/// default blocking push never returns this.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("queue is full")]
pub struct QueueFull;

/// A sink failed to write, open, or rename a file.
#[derive(Debug, Error)]
pub enum SinkIOError {
  #[error("failed to open {path}: {source}")]
  Open {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to write to {path}: {source}")]
  Write {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to archive {from} -> {to}: {source}")]
  Rename {
    from: std::path::PathBuf,
    to: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A control operation (`add_queue`/`remove_queue`) was issued against a
/// poller that is not currently running.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("poller is not running")]
pub struct PollerNotRunning;
