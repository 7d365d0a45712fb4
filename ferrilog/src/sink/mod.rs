//! Sinks: the consumers of a finished [`Record`].

pub mod async_sink;
pub mod level_filter;
pub mod memory;
pub mod multi;
pub mod rolling_file;
pub mod stdout;

pub use async_sink::AsyncSink;
pub use level_filter::LevelFilterSink;
pub use memory::MemorySink;
pub use multi::MultiSink;
pub use rolling_file::RollingFileSink;
pub use stdout::StdoutSink;

use crate::record::Record;

/// A component that consumes a finished event record and renders or
/// persists it.
///
/// Sinks take the record by value: a synchronous sink formats and writes
/// it within this call and then drops it; [`AsyncSink`] instead moves it
/// into a queue slot for a poller thread to dispatch later.
pub trait Sink: Send + Sync {
  fn sink(&self, record: Record);

  /// Flush any buffered output. The default is a no-op for sinks that
  /// write through on every call.
  fn flush(&self) {}
}
