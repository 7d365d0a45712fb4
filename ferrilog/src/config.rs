//! TOML configuration: turns a `{sinks, loggers}` document into a
//! [`Registry`]. The file watcher that would make this live-reloading is
//! an external collaborator, not part of this crate.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{ConfigError, SourceRegion};
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::registry::Registry;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ConfigDoc {
  #[serde(default)]
  sinks: HashMap<String, SinkConfig>,
  #[serde(default)]
  loggers: Vec<LoggerConfig>,
}

#[derive(Debug, Deserialize)]
struct SinkConfig {
  #[serde(rename = "type")]
  type_name: String,
  #[serde(default)]
  options: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LoggerConfig {
  name: String,
  level: String,
  sinks: Vec<String>,
  #[serde(default)]
  default: bool,
}

/// Parse `source` and build a [`Registry`] from it, resolving sink types
/// against `registry`'s registered factories (see
/// [`Registry::register_factory`]).
///
/// When `expand_env` is set, `${NAME}` occurrences in string option values
/// are replaced with the matching environment variable (left verbatim if
/// unset) before the sink factory sees them.
pub fn configure(source: &str, registry: &Registry, expand_env: bool) -> Result<(), ConfigError> {
  let doc: ConfigDoc = toml::from_str(source).map_err(|err| to_config_error(source, err))?;

  let mut built_sinks: HashMap<String, Arc<dyn crate::sink::Sink>> = HashMap::new();
  for (name, sink_config) in &doc.sinks {
    let options = if expand_env {
      expand_env_vars(&sink_config.options)
    } else {
      sink_config.options.clone()
    };
    let sink = registry.build_sink(&sink_config.type_name, &options).map_err(|description| ConfigError {
      description: format!("sink '{name}': {description}"),
      region: SourceRegion::default(),
    })?;
    registry.register_sink(name.clone(), sink.clone());
    built_sinks.insert(name.clone(), sink);
  }

  let default_count = doc.loggers.iter().filter(|l| l.default).count();
  if default_count > 1 {
    return Err(ConfigError {
      description: "more than one logger is marked `default = true`".to_string(),
      region: SourceRegion::default(),
    });
  }

  for logger_config in &doc.loggers {
    let level: LogLevel = logger_config.level.parse().map_err(|description| ConfigError {
      description: format!("logger '{}': {description}", logger_config.name),
      region: SourceRegion::default(),
    })?;

    let mut sinks_for_logger = Vec::with_capacity(logger_config.sinks.len());
    for sink_name in &logger_config.sinks {
      let sink = built_sinks.get(sink_name).cloned().ok_or_else(|| ConfigError {
        description: format!(
          "logger '{}' references undefined sink '{sink_name}'",
          logger_config.name
        ),
        region: SourceRegion::default(),
      })?;
      sinks_for_logger.push(sink);
    }

    let sink: Arc<dyn crate::sink::Sink> = if sinks_for_logger.len() == 1 {
      sinks_for_logger.into_iter().next().unwrap()
    } else {
      Arc::new(crate::sink::MultiSink::new(sinks_for_logger))
    };

    let logger = Arc::new(Logger::new(logger_config.name.clone(), level, sink));
    if logger_config.default {
      registry.set_default_logger(logger.clone());
    }
    registry.register_logger(logger);
  }

  Ok(())
}

fn expand_env_vars(options: &HashMap<String, String>) -> HashMap<String, String> {
  options
    .iter()
    .map(|(k, v)| (k.clone(), expand_one(v)))
    .collect()
}

fn expand_one(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  let mut rest = value;
  while let Some(start) = rest.find("${") {
    out.push_str(&rest[..start]);
    let Some(end) = rest[start..].find('}') else {
      out.push_str(&rest[start..]);
      rest = "";
      break;
    };
    let name = &rest[start + 2..start + end];
    if let Ok(value) = std::env::var(name) {
      out.push_str(&value);
    } else {
      out.push_str(&rest[start..start + end + 1]);
    }
    rest = &rest[start + end + 1..];
  }
  out.push_str(rest);
  out
}

fn to_config_error(source: &str, err: toml::de::Error) -> ConfigError {
  let region = err
    .span()
    .map(|span| byte_offset_to_line_col(source, span.start))
    .unwrap_or_default();
  ConfigError {
    description: err.message().to_string(),
    region,
  }
}

fn byte_offset_to_line_col(source: &str, offset: usize) -> SourceRegion {
  let mut line = 1;
  let mut column = 1;
  for ch in source[..offset.min(source.len())].chars() {
    if ch == '\n' {
      line += 1;
      column = 1;
    } else {
      column += 1;
    }
  }
  SourceRegion { line, column }
}
