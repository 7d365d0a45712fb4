//! A console sink: formats through a [`RecordFormatter`] and writes to
//! stdout. Deliberately uncolored — per-sink colorization is an external
//! collaborator (see the crate's non-goals), not a core concern.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::format::RecordFormatter;
use crate::record::Record;

use super::Sink;

pub struct StdoutSink<F: RecordFormatter> {
  formatter: F,
  scratch: Mutex<String>,
}

impl<F: RecordFormatter> StdoutSink<F> {
  pub fn new(formatter: F) -> Self {
    Self {
      formatter,
      scratch: Mutex::new(String::with_capacity(256)),
    }
  }
}

impl<F: RecordFormatter> Sink for StdoutSink<F> {
  fn sink(&self, record: Record) {
    let mut buf = self.scratch.lock().unwrap();
    buf.clear();
    self.formatter.format(&record, &mut buf);
    buf.push('\n');
    let _ = io::stdout().write_all(buf.as_bytes());
  }

  fn flush(&self) {
    let _ = io::stdout().flush();
  }
}
