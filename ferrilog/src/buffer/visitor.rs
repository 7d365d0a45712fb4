//! The field visitor: a polymorphic walk over one record's typed fields
//! without runtime downcasting.
//!
//! Visitation is re-entrant across records but serial within one record:
//! a single visitor instance may be reused for record after record, but
//! `visit_start`/`visit`*/`visit_end` for one record always complete before
//! the next record's calls begin.

/// One overload per supported scalar type, matching the closed set in
/// [`crate::buffer::offset::ScalarTag`].
pub trait FieldVisitor {
  fn visit_start(&mut self, count: usize);

  fn visit_str(&mut self, key: &str, value: &str);
  fn visit_u8(&mut self, key: &str, value: u8);
  fn visit_u16(&mut self, key: &str, value: u16);
  fn visit_u32(&mut self, key: &str, value: u32);
  fn visit_u64(&mut self, key: &str, value: u64);
  fn visit_i8(&mut self, key: &str, value: i8);
  fn visit_i16(&mut self, key: &str, value: i16);
  fn visit_i32(&mut self, key: &str, value: i32);
  fn visit_i64(&mut self, key: &str, value: i64);
  fn visit_f32(&mut self, key: &str, value: f32);
  fn visit_f64(&mut self, key: &str, value: f64);
  fn visit_bool(&mut self, key: &str, value: bool);

  fn visit_end(&mut self);
}

/// An owned, type-erased field value, handy for visitors that want to
/// collect a record's fields rather than render them inline.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedFieldValue {
  Str(String),
  U8(u8),
  U16(u16),
  U32(u32),
  U64(u64),
  I8(i8),
  I16(i16),
  I32(i32),
  I64(i64),
  F32(f32),
  F64(f64),
  Bool(bool),
}

impl std::fmt::Display for OwnedFieldValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OwnedFieldValue::Str(v) => f.write_str(v),
      OwnedFieldValue::U8(v) => write!(f, "{v}"),
      OwnedFieldValue::U16(v) => write!(f, "{v}"),
      OwnedFieldValue::U32(v) => write!(f, "{v}"),
      OwnedFieldValue::U64(v) => write!(f, "{v}"),
      OwnedFieldValue::I8(v) => write!(f, "{v}"),
      OwnedFieldValue::I16(v) => write!(f, "{v}"),
      OwnedFieldValue::I32(v) => write!(f, "{v}"),
      OwnedFieldValue::I64(v) => write!(f, "{v}"),
      OwnedFieldValue::F32(v) => write!(f, "{v}"),
      OwnedFieldValue::F64(v) => write!(f, "{v}"),
      OwnedFieldValue::Bool(v) => write!(f, "{v}"),
    }
  }
}

/// A visitor that collects fields into an owned `Vec`, used by tests and by
/// sinks that need the whole field set before rendering (e.g. logfmt's `%+`
/// standard-key prefix).
#[derive(Debug, Default)]
pub struct CollectingVisitor {
  pub fields: Vec<(String, OwnedFieldValue)>,
}

impl FieldVisitor for CollectingVisitor {
  fn visit_start(&mut self, count: usize) {
    self.fields.reserve(count);
  }

  fn visit_str(&mut self, key: &str, value: &str) {
    self.fields.push((key.to_string(), OwnedFieldValue::Str(value.to_string())));
  }
  fn visit_u8(&mut self, key: &str, value: u8) {
    self.fields.push((key.to_string(), OwnedFieldValue::U8(value)));
  }
  fn visit_u16(&mut self, key: &str, value: u16) {
    self.fields.push((key.to_string(), OwnedFieldValue::U16(value)));
  }
  fn visit_u32(&mut self, key: &str, value: u32) {
    self.fields.push((key.to_string(), OwnedFieldValue::U32(value)));
  }
  fn visit_u64(&mut self, key: &str, value: u64) {
    self.fields.push((key.to_string(), OwnedFieldValue::U64(value)));
  }
  fn visit_i8(&mut self, key: &str, value: i8) {
    self.fields.push((key.to_string(), OwnedFieldValue::I8(value)));
  }
  fn visit_i16(&mut self, key: &str, value: i16) {
    self.fields.push((key.to_string(), OwnedFieldValue::I16(value)));
  }
  fn visit_i32(&mut self, key: &str, value: i32) {
    self.fields.push((key.to_string(), OwnedFieldValue::I32(value)));
  }
  fn visit_i64(&mut self, key: &str, value: i64) {
    self.fields.push((key.to_string(), OwnedFieldValue::I64(value)));
  }
  fn visit_f32(&mut self, key: &str, value: f32) {
    self.fields.push((key.to_string(), OwnedFieldValue::F32(value)));
  }
  fn visit_f64(&mut self, key: &str, value: f64) {
    self.fields.push((key.to_string(), OwnedFieldValue::F64(value)));
  }
  fn visit_bool(&mut self, key: &str, value: bool) {
    self.fields.push((key.to_string(), OwnedFieldValue::Bool(value)));
  }

  fn visit_end(&mut self) {}
}
