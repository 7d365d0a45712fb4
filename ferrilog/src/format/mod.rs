//! Record formatting: a pattern-driven renderer shared by the
//! human-readable pattern formatter and the `logfmt`-style formatter.
//!
//! Both flavors parse a pattern string once into an ordered list of flag
//! [`Renderer`]s (see [`parser`]); formatting a record is then just walking
//! that list. The only difference between the two flavors is whether a
//! rendered flag's text gets wrapped in quotes when it contains a space
//! (the `logfmt` quoting rule) — see [`logfmt::LogfmtFormatter`].

mod flags;
pub mod logfmt;
pub mod pattern;

pub use flags::{CustomFlagFactory, CustomRenderer, FlagRegistry};
pub use logfmt::LogfmtFormatter;
pub use pattern::PatternFormatter;

use crate::record::Record;

/// Renders a finished [`Record`] into a caller-supplied text buffer.
pub trait RecordFormatter: Send + Sync {
  fn format(&self, record: &Record, out: &mut String);

  fn format_to_string(&self, record: &Record) -> String {
    let mut out = String::new();
    self.format(record, &mut out);
    out
  }
}

/// Lets a sink generic over `F: RecordFormatter` hold a runtime-chosen
/// formatter, as the registry's built-in sink factories need to.
impl RecordFormatter for Box<dyn RecordFormatter> {
  fn format(&self, record: &Record, out: &mut String) {
    (**self).format(record, out)
  }
}
