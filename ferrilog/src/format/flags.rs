//! Pattern parsing and the flag renderers it produces.
//!
//! Grammar: a literal run becomes a [`Renderer::Literal`]; a `%` introduces
//! a flag letter from the fixed set (`Y m d H M S i u l n v t p o + f`) or a
//! registered custom flag, optionally followed by a bracketed parameter
//! (`%j[param]`). An unrecognized flag, or a trailing `%` with no letter,
//! is a [`PatternError`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::buffer::visitor::FieldVisitor;
use crate::error::PatternError;
use crate::record::Record;

/// Produces a [`CustomRenderer`] for one occurrence of a registered custom
/// flag, given the optional bracketed parameter that followed it in the
/// pattern string.
pub trait CustomFlagFactory: Send + Sync {
  fn create(&self, param: Option<&str>) -> Box<dyn CustomRenderer>;
}

impl<F> CustomFlagFactory for F
where
  F: Fn(Option<&str>) -> Box<dyn CustomRenderer> + Send + Sync,
{
  fn create(&self, param: Option<&str>) -> Box<dyn CustomRenderer> {
    self(param)
  }
}

/// A custom flag's rendering behavior, bound to the parameter it was
/// created with.
pub trait CustomRenderer: Send + Sync {
  fn render(&self, record: &Record, out: &mut String);
}

/// Flag characters a caller may register a custom renderer factory under.
/// Registration is consulted during pattern parsing, so it must happen
/// before the pattern that uses the flag is compiled.
#[derive(Default, Clone)]
pub struct FlagRegistry {
  factories: HashMap<char, Arc<dyn CustomFlagFactory>>,
}

impl FlagRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, flag: char, factory: impl CustomFlagFactory + 'static) {
    self.factories.insert(flag, Arc::new(factory));
  }
}

/// One compiled step of a pattern: either verbatim text or a value pulled
/// from the record at format time.
pub(super) enum Renderer {
  Literal(String),
  Year,
  Month,
  Day,
  Hour,
  Minute,
  Second,
  Millis,
  Micros,
  Level,
  LoggerName,
  Message,
  ThreadId,
  SourceFile,
  SourceLine,
  FullDefault,
  FieldsBlock,
  Custom(Box<dyn CustomRenderer>),
}

impl Renderer {
  /// Flags whose rendered text is never wrapped in logfmt quotes, even by
  /// a quoting formatter: literals are verbatim template text, and the
  /// fields block already applies per-field quoting internally.
  fn self_quotes(&self) -> bool {
    matches!(self, Renderer::Literal(_) | Renderer::FieldsBlock | Renderer::FullDefault)
  }

  fn render_raw(&self, record: &Record, out: &mut String) {
    match self {
      Renderer::Literal(text) => out.push_str(text),
      Renderer::Year => {
        let _ = write!(out, "{:04}", record.timestamp.format("%Y"));
      }
      Renderer::Month => {
        let _ = write!(out, "{:02}", record.timestamp.format("%m"));
      }
      Renderer::Day => {
        let _ = write!(out, "{:02}", record.timestamp.format("%d"));
      }
      Renderer::Hour => {
        let _ = write!(out, "{:02}", record.timestamp.format("%H"));
      }
      Renderer::Minute => {
        let _ = write!(out, "{:02}", record.timestamp.format("%M"));
      }
      Renderer::Second => {
        let _ = write!(out, "{:02}", record.timestamp.format("%S"));
      }
      Renderer::Millis => {
        let _ = write!(out, "{:03}", record.timestamp.timestamp_subsec_millis());
      }
      Renderer::Micros => {
        let _ = write!(out, "{:06}", record.timestamp.timestamp_subsec_micros());
      }
      Renderer::Level => out.push_str(record.level.as_str()),
      Renderer::LoggerName => out.push_str(&record.logger),
      Renderer::Message => out.push_str(record.message()),
      Renderer::ThreadId => {
        let _ = write!(out, "{}", record.thread_id);
      }
      Renderer::SourceFile => {
        if let Some(src) = record.source {
          out.push_str(src.file);
        }
      }
      Renderer::SourceLine => {
        if let Some(src) = record.source {
          let _ = write!(out, "{}", src.line);
        }
      }
      Renderer::FullDefault => {
        let _ = write!(
          out,
          "ts={} lvl={} logger={} msg=",
          record.timestamp.to_rfc3339(),
          record.level.as_str(),
          record.logger
        );
        push_quoted(out, record.message());
      }
      Renderer::FieldsBlock => push_fields_logfmt(record, out),
      Renderer::Custom(custom) => custom.render(record, out),
    }
  }

  /// Render this flag, applying logfmt quoting to the result when
  /// `quote_dynamic` is set and this flag's output isn't self-quoting.
  pub(super) fn render(&self, record: &Record, quote_dynamic: bool, out: &mut String) {
    if !quote_dynamic || self.self_quotes() {
      self.render_raw(record, out);
      return;
    }
    let mut scratch = String::new();
    self.render_raw(record, &mut scratch);
    if scratch.contains(' ') {
      out.push('"');
      out.push_str(&scratch);
      out.push('"');
    } else {
      out.push_str(&scratch);
    }
  }
}

fn push_quoted(out: &mut String, value: &str) {
  if value.contains(' ') {
    out.push('"');
    out.push_str(value);
    out.push('"');
  } else {
    out.push_str(value);
  }
}

/// Renders the structured-fields block as space-separated `key=value`
/// pairs, quoting any value whose string form contains a space. This is
/// `%f`'s job regardless of which formatter hosts it — the fields block is
/// always logfmt-shaped.
fn push_fields_logfmt(record: &Record, out: &mut String) {
  struct LogfmtVisitor<'a> {
    out: &'a mut String,
  }

  impl LogfmtVisitor<'_> {
    fn push(&mut self, key: &str, value: impl std::fmt::Display) {
      self.out.push(' ');
      self.out.push_str(key);
      self.out.push('=');
      let rendered = value.to_string();
      if rendered.contains(' ') {
        self.out.push('"');
        self.out.push_str(&rendered);
        self.out.push('"');
      } else {
        self.out.push_str(&rendered);
      }
    }
  }

  impl FieldVisitor for LogfmtVisitor<'_> {
    fn visit_start(&mut self, _count: usize) {}
    fn visit_str(&mut self, key: &str, value: &str) {
      self.push(key, value);
    }
    fn visit_u8(&mut self, key: &str, value: u8) {
      self.push(key, value);
    }
    fn visit_u16(&mut self, key: &str, value: u16) {
      self.push(key, value);
    }
    fn visit_u32(&mut self, key: &str, value: u32) {
      self.push(key, value);
    }
    fn visit_u64(&mut self, key: &str, value: u64) {
      self.push(key, value);
    }
    fn visit_i8(&mut self, key: &str, value: i8) {
      self.push(key, value);
    }
    fn visit_i16(&mut self, key: &str, value: i16) {
      self.push(key, value);
    }
    fn visit_i32(&mut self, key: &str, value: i32) {
      self.push(key, value);
    }
    fn visit_i64(&mut self, key: &str, value: i64) {
      self.push(key, value);
    }
    fn visit_f32(&mut self, key: &str, value: f32) {
      self.push(key, value);
    }
    fn visit_f64(&mut self, key: &str, value: f64) {
      self.push(key, value);
    }
    fn visit_bool(&mut self, key: &str, value: bool) {
      self.push(key, value);
    }
    fn visit_end(&mut self) {}
  }

  let mut visitor = LogfmtVisitor { out };
  let _ = record.buffer.visit_fields(&mut visitor);
}

/// A pattern compiled into its ordered renderer list. Immutable after
/// construction and safe to share across concurrently-invoked sinks.
pub(super) struct CompiledPattern {
  renderers: Vec<Renderer>,
}

impl CompiledPattern {
  pub(super) fn parse(pattern: &str, registry: &FlagRegistry) -> Result<Self, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut renderers = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
      let c = chars[i];
      if c != '%' {
        literal.push(c);
        i += 1;
        continue;
      }

      if !literal.is_empty() {
        renderers.push(Renderer::Literal(std::mem::take(&mut literal)));
      }

      let column = i + 1;
      i += 1;
      let Some(&flag) = chars.get(i) else {
        return Err(PatternError {
          column,
          description: "trailing '%' with no flag letter".to_string(),
        });
      };
      i += 1;

      let renderer = match flag {
        'Y' => Renderer::Year,
        'm' => Renderer::Month,
        'd' => Renderer::Day,
        'H' => Renderer::Hour,
        'M' => Renderer::Minute,
        'S' => Renderer::Second,
        'i' => Renderer::Millis,
        'u' => Renderer::Micros,
        'l' => Renderer::Level,
        'n' => Renderer::LoggerName,
        'v' => Renderer::Message,
        't' => Renderer::ThreadId,
        'p' => Renderer::SourceFile,
        'o' => Renderer::SourceLine,
        '+' => Renderer::FullDefault,
        'f' => Renderer::FieldsBlock,
        other => {
          let Some(factory) = registry.factories.get(&other) else {
            return Err(PatternError {
              column,
              description: format!("unrecognized pattern flag '%{other}'"),
            });
          };

          let param = if chars.get(i) == Some(&'[') {
            let start = i + 1;
            let mut end = start;
            while chars.get(end).is_some_and(|&c| c != ']') {
              end += 1;
            }
            if chars.get(end) != Some(&']') {
              return Err(PatternError {
                column,
                description: format!("unterminated bracketed parameter for '%{other}['"),
              });
            }
            let param: String = chars[start..end].iter().collect();
            i = end + 1;
            Some(param)
          } else {
            None
          };

          Renderer::Custom(factory.create(param.as_deref()))
        }
      };
      renderers.push(renderer);
    }

    if !literal.is_empty() {
      renderers.push(Renderer::Literal(literal));
    }

    Ok(Self { renderers })
  }

  pub(super) fn format(&self, record: &Record, quote_dynamic: bool, out: &mut String) {
    for renderer in &self.renderers {
      renderer.render(record, quote_dynamic, out);
    }
  }
}
