//! The registry: a name-indexed store of loggers and sinks, with
//! longest-dotted-prefix resolution and sink factories for configuration.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::format::{LogfmtFormatter, PatternFormatter, RecordFormatter};
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::sink::rolling_file::{
  ArchivePolicy, CompositePolicy, IncrementalArchive, OpenMode, RollingFileSink, RollingPolicy, SizePolicy, TimePolicy,
  TimeRollMode, TimeUnit, TimestampArchive, TimestampZone,
};
use crate::sink::{Sink, StdoutSink};

/// Builds a sink from a configuration's `options` table (string -> string).
/// Registered per sink type name so `config::configure` can turn a parsed
/// `{type, options}` pair into a constructed sink without the registry
/// knowing about any concrete sink type.
pub type SinkFactory = Box<dyn Fn(&HashMap<String, String>) -> Result<Arc<dyn Sink>, String> + Send + Sync>;

const DEFAULT_LOGGER_NAME: &str = "";

/// Name-indexed store of loggers and sinks, plus sink factories keyed by
/// type name. Resolution of `a.b.c` walks `a.b.c`, `a.b`, `a`, then the
/// default logger — invariant: at most one logger is registered per exact
/// name (a `HashMap` key already guarantees this).
pub struct Registry {
  loggers: RwLock<HashMap<String, Arc<Logger>>>,
  sinks: RwLock<HashMap<String, Arc<dyn Sink>>>,
  factories: RwLock<HashMap<String, SinkFactory>>,
}

impl Registry {
  /// A fresh registry with only the built-in default logger (a stdout sink
  /// at `Info`) registered, plus the `stdout` and `rolling_file` sink
  /// factories a TOML document passed to [`crate::config::configure`] can
  /// name without the caller registering anything by hand. Tests should use
  /// this rather than [`Registry::global`] to avoid cross-test interference
  /// through the process-wide singleton.
  pub fn new() -> Self {
    let default_sink: Arc<dyn Sink> = Arc::new(StdoutSink::new(LogfmtFormatter::standard()));
    let default_logger = Arc::new(Logger::new("", LogLevel::Info, default_sink));

    let mut loggers = HashMap::new();
    loggers.insert(DEFAULT_LOGGER_NAME.to_string(), default_logger);

    let mut factories: HashMap<String, SinkFactory> = HashMap::new();
    factories.insert("stdout".to_string(), Box::new(build_stdout_sink));
    factories.insert("rolling_file".to_string(), Box::new(build_rolling_file_sink));

    Self {
      loggers: RwLock::new(loggers),
      sinks: RwLock::new(HashMap::new()),
      factories: RwLock::new(factories),
    }
  }

  /// The process-wide, lazily initialized default registry. Global mutable
  /// state is intentionally limited to this one singleton.
  pub fn global() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::new)
  }

  pub fn register_logger(&self, logger: Arc<Logger>) {
    self.loggers.write().unwrap().insert(logger.name().to_string(), logger);
  }

  pub fn register_sink(&self, name: impl Into<String>, sink: Arc<dyn Sink>) {
    self.sinks.write().unwrap().insert(name.into(), sink);
  }

  pub fn sink(&self, name: &str) -> Option<Arc<dyn Sink>> {
    self.sinks.read().unwrap().get(name).cloned()
  }

  pub fn register_factory(&self, type_name: impl Into<String>, factory: SinkFactory) {
    self.factories.write().unwrap().insert(type_name.into(), factory);
  }

  pub fn factory_names(&self) -> Vec<String> {
    self.factories.read().unwrap().keys().cloned().collect()
  }

  pub fn build_sink(&self, type_name: &str, options: &HashMap<String, String>) -> Result<Arc<dyn Sink>, String> {
    let factories = self.factories.read().unwrap();
    let factory = factories
      .get(type_name)
      .ok_or_else(|| format!("no sink factory registered for type '{type_name}'"))?;
    factory(options)
  }

  /// Longest-registered-prefix resolution over `name`'s dot-separated
  /// fragments, falling back to the default logger.
  pub fn get(&self, name: &str) -> Arc<Logger> {
    let loggers = self.loggers.read().unwrap();
    if let Some(logger) = loggers.get(name) {
      return logger.clone();
    }

    let fragments: Vec<&str> = name.split('.').collect();
    for end in (1..fragments.len()).rev() {
      let prefix = fragments[..end].join(".");
      if let Some(logger) = loggers.get(&prefix) {
        return logger.clone();
      }
    }

    loggers
      .get(DEFAULT_LOGGER_NAME)
      .expect("the default logger is always registered")
      .clone()
  }

  pub fn set_default_logger(&self, logger: Arc<Logger>) {
    self.loggers.write().unwrap().insert(DEFAULT_LOGGER_NAME.to_string(), logger);
  }
}

/// `options["format"]`: `"pattern"` uses `options["pattern"]` verbatim;
/// anything else (including absent) is `logfmt`, optionally with its own
/// pattern override.
fn build_formatter(options: &HashMap<String, String>) -> Result<Box<dyn RecordFormatter>, String> {
  match options.get("format").map(String::as_str) {
    Some("pattern") => {
      let pattern = options.get("pattern").ok_or("sink format \"pattern\" requires a \"pattern\" option")?;
      let formatter = PatternFormatter::new(pattern).map_err(|e| e.to_string())?;
      Ok(Box::new(formatter))
    }
    _ => match options.get("pattern") {
      Some(pattern) => Ok(Box::new(LogfmtFormatter::new(pattern).map_err(|e| e.to_string())?)),
      None => Ok(Box::new(LogfmtFormatter::standard())),
    },
  }
}

fn build_stdout_sink(options: &HashMap<String, String>) -> Result<Arc<dyn Sink>, String> {
  let formatter = build_formatter(options)?;
  Ok(Arc::new(StdoutSink::new(formatter)))
}

fn parse_time_unit(value: &str) -> Result<TimeUnit, String> {
  match value {
    "minute" => Ok(TimeUnit::Minute),
    "hour" => Ok(TimeUnit::Hour),
    "day" => Ok(TimeUnit::Day),
    "month" => Ok(TimeUnit::Month),
    "year" => Ok(TimeUnit::Year),
    other => Err(format!("unknown time_unit \"{other}\"")),
  }
}

fn build_rolling_file_sink(options: &HashMap<String, String>) -> Result<Arc<dyn Sink>, String> {
  let path = options.get("path").ok_or("rolling_file sink requires a \"path\" option")?;
  let formatter = build_formatter(options)?;

  let open_mode = match options.get("open_mode").map(String::as_str) {
    Some("truncate") => OpenMode::Truncate,
    _ => OpenMode::Append,
  };

  let mut policies: Vec<Box<dyn RollingPolicy>> = Vec::new();
  if let Some(max_bytes) = options.get("max_bytes") {
    let max_bytes: u64 = max_bytes.parse().map_err(|_| format!("invalid max_bytes \"{max_bytes}\""))?;
    policies.push(Box::new(SizePolicy { max_bytes }));
  }
  if let Some(unit) = options.get("time_unit") {
    let unit = parse_time_unit(unit)?;
    let mode = match options.get("time_mode").map(String::as_str) {
      Some("precise") => TimeRollMode::Precise,
      _ => TimeRollMode::Round,
    };
    policies.push(Box::new(TimePolicy::new(unit, mode, chrono::Utc::now())));
  }
  if policies.is_empty() {
    return Err("rolling_file sink requires at least one of \"max_bytes\" or \"time_unit\"".to_string());
  }
  let roll_policy: Box<dyn RollingPolicy> = if policies.len() == 1 {
    policies.pop().unwrap()
  } else {
    Box::new(CompositePolicy::new(policies))
  };

  let archive_policy: Box<dyn ArchivePolicy> = match options.get("archive").map(String::as_str) {
    Some("timestamp") => {
      let zone = match options.get("timestamp_zone").map(String::as_str) {
        Some("local") => TimestampZone::Local,
        _ => TimestampZone::Utc,
      };
      match options.get("timestamp_pattern") {
        Some(pattern) => Box::new(TimestampArchive::new(pattern.clone(), zone)),
        None => Box::new(TimestampArchive::with_default_pattern(zone)),
      }
    }
    _ => Box::new(IncrementalArchive),
  };

  let sink = RollingFileSink::open(path.clone(), open_mode, roll_policy, archive_policy, formatter).map_err(|e| e.to_string())?;
  Ok(Arc::new(sink))
}

impl Default for Registry {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::sink::MemorySink;

  #[test]
  fn hierarchical_resolution_matches_scenario() {
    let registry = Registry::new();
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());

    registry.register_logger(Arc::new(Logger::new("My.Namespace", LogLevel::Info, sink.clone())));
    registry.register_logger(Arc::new(Logger::new("My.Namespace.Class", LogLevel::Debug, sink.clone())));

    assert_eq!(registry.get("My.Namespace.Class").level(), LogLevel::Debug);
    assert_eq!(registry.get("My.Namespace.Other").level(), LogLevel::Info);
    assert_eq!(registry.get("Unrelated").name(), "");
  }

  #[test]
  fn exact_name_has_at_most_one_logger() {
    let registry = Registry::new();
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    registry.register_logger(Arc::new(Logger::new("app", LogLevel::Info, sink.clone())));
    registry.register_logger(Arc::new(Logger::new("app", LogLevel::Error, sink)));

    assert_eq!(registry.get("app").level(), LogLevel::Error);
    assert_eq!(registry.loggers.read().unwrap().len(), 2); // "" default + "app"
  }

  #[test]
  fn builtin_factories_are_preregistered() {
    let registry = Registry::new();
    let mut names = registry.factory_names();
    names.sort();
    assert_eq!(names, vec!["rolling_file".to_string(), "stdout".to_string()]);
  }

  #[test]
  fn rolling_file_factory_builds_a_working_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let registry = Registry::new();
    let mut options = HashMap::new();
    options.insert("path".to_string(), path.to_string_lossy().into_owned());
    options.insert("max_bytes".to_string(), "1048576".to_string());

    let sink = registry.build_sink("rolling_file", &options).unwrap();
    let logger = Arc::new(Logger::new("app", LogLevel::Info, sink));
    logger.info("hello from the built sink", &[]);
    logger.flush();

    assert!(path.exists());
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("hello from the built sink"));
  }

  #[test]
  fn stdout_factory_rejects_pattern_format_without_a_pattern() {
    let registry = Registry::new();
    let mut options = HashMap::new();
    options.insert("format".to_string(), "pattern".to_string());
    assert!(registry.build_sink("stdout", &options).is_err());
  }
}
