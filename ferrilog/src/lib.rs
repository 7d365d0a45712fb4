//! ferrilog: a structured, high-throughput, asynchronous logging library.
//!
//! A hot code path builds an [`buffer::EventBuffer`] inline — no heap
//! allocation in the common case, no string formatting — and hands it to
//! a [`sink::Sink`]. An [`sink::AsyncSink`] copies that buffer into a
//! lock-free queue and returns immediately; a dedicated [`transport::Poller`]
//! thread later drains the queue and dispatches to the wrapped sink, which
//! formats (via [`format::PatternFormatter`] or [`format::LogfmtFormatter`])
//! and persists (e.g. [`sink::RollingFileSink`]).
//!
//! [`registry::Registry`] is the name-indexed façade tying loggers to
//! sinks, resolvable either by hand or from a TOML document via
//! [`config::configure`].

pub mod buffer;
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;
pub mod shutdown;
pub mod sink;
pub mod transport;

pub use buffer::EventBuffer;
pub use level::LogLevel;
pub use logger::Logger;
pub use record::Record;
pub use registry::Registry;

use std::sync::Arc;

/// Resolve a logger by dotted name against the process-wide default
/// registry.
pub fn get_logger(name: &str) -> Arc<Logger> {
  Registry::global().get(name)
}
