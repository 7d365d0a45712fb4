use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered `Trace < Debug < Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum LogLevel {
  Trace,
  Debug,
  Info,
  Warning,
  Error,
}

impl LogLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      LogLevel::Trace => "Trace",
      LogLevel::Debug => "Debug",
      LogLevel::Info => "Info",
      LogLevel::Warning => "Warn",
      LogLevel::Error => "Error",
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "trace" => Ok(LogLevel::Trace),
      "debug" => Ok(LogLevel::Debug),
      "info" => Ok(LogLevel::Info),
      "warning" | "warn" => Ok(LogLevel::Warning),
      "error" => Ok(LogLevel::Error),
      other => Err(format!("unknown log level: {other}")),
    }
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;

  #[test]
  fn ordering_is_severity_ordered() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Info < LogLevel::Warning);
    assert!(LogLevel::Warning < LogLevel::Error);
  }

  #[test]
  fn parses_case_insensitively() {
    assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert!("bogus".parse::<LogLevel>().is_err());
  }
}
