//! `EventBuffer`: the inline binary record produced by one logging call.

use smallvec::SmallVec;

use crate::error::{CorruptRecord, RecordTooLarge};

use super::offset::{FieldRecord, FieldTag, Scalar, FIELD_RECORD_WIDTH};
use super::visitor::FieldVisitor;
use super::{Bytes, ScalarOffset, StringOffset};

/// Discriminant written into the header describing how to walk the
/// structured-fields block at format time.
///
/// The original encodes a raw function pointer directly into the buffer's
/// bytes. That is replaced here with a small tag plus a static dispatch
/// table (see [`DISPATCH_TABLE`]): no pointer ever lives inside the record,
/// and lookup is still `O(1)`. There is exactly one shape today because the
/// set of record layouts is closed, just like the set of scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatchTag {
  Record = 0,
}

impl DispatchTag {
  fn from_byte(byte: u8) -> Self {
    match byte {
      0 => DispatchTag::Record,
      other => panic!("corrupt dispatch tag byte: {other}"),
    }
  }
}

type FormatFn = fn(&EventBuffer, &mut dyn FieldVisitor) -> Result<(), CorruptRecord>;

const DISPATCH_TABLE: [FormatFn; 1] = [format_record];

fn format_record(buffer: &EventBuffer, visitor: &mut dyn FieldVisitor) -> Result<(), CorruptRecord> {
  let (index, count) = buffer.fields_block();
  visitor.visit_start(count as usize);

  let mut cursor = index as usize;
  for _ in 0..count {
    let record = buffer.read_field_record(cursor)?;
    cursor += FIELD_RECORD_WIDTH;

    let key = buffer.read_string(record.key)?;
    match record.value_tag {
      FieldTag::Str => visitor.visit_str(key, buffer.read_string(StringOffset::new(record.value_offset))?),
      FieldTag::U8 => visitor.visit_u8(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::U16 => visitor.visit_u16(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::U32 => visitor.visit_u32(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::U64 => visitor.visit_u64(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::I8 => visitor.visit_i8(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::I16 => visitor.visit_i16(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::I32 => visitor.visit_i32(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::I64 => visitor.visit_i64(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::F32 => visitor.visit_f32(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::F64 => visitor.visit_f64(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
      FieldTag::Bool => visitor.visit_bool(key, buffer.read_scalar(ScalarOffset::new(record.value_offset))?),
    }
  }

  visitor.visit_end();
  Ok(())
}

/// Fixed 5-byte header living at offset 0: a one-byte dispatch tag plus the
/// two-byte index and two-byte count of the structured-fields block.
const HEADER_LEN: usize = 5;

/// The binary record produced by one logging call.
///
/// Construction is append-only: scalars and strings are written in the
/// order the caller wants them read back, fields are written last (each
/// field appends its key, its value, and a field record into a pending
/// list), and `finalize` writes the field records and the header in one
/// shot, after which the buffer is read-only.
#[derive(Debug, Clone)]
pub struct EventBuffer {
  data: Bytes,
  pending_fields: SmallVec<[FieldRecord; 3]>,
  finalized: bool,
}

impl Default for EventBuffer {
  fn default() -> Self {
    Self::new()
  }
}

impl EventBuffer {
  pub fn new() -> Self {
    let mut data = Bytes::new();
    data.extend(std::iter::repeat(0u8).take(HEADER_LEN));
    Self {
      data,
      pending_fields: SmallVec::new(),
      finalized: false,
    }
  }

  /// Total number of live bytes, header included.
  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// `true` once storage has spilled from the inline array to the heap.
  pub fn is_heap_allocated(&self) -> bool {
    self.data.spilled()
  }

  pub fn is_finalized(&self) -> bool {
    self.finalized
  }

  fn ensure_capacity(&self, additional: usize) -> Result<(), RecordTooLarge> {
    let attempted = self.data.len() + additional;
    if attempted > u16::MAX as usize {
      return Err(RecordTooLarge {
        attempted,
        limit: u16::MAX as usize,
      });
    }
    Ok(())
  }

  /// Append a little-endian scalar, returning its offset.
  pub fn write<T: Scalar>(&mut self, value: T) -> Result<ScalarOffset<T>, RecordTooLarge> {
    self.ensure_capacity(T::WIDTH)?;
    let offset = self.data.len() as u16;
    value.write_le(&mut self.data);
    Ok(ScalarOffset::new(offset))
  }

  /// Append a 2-byte length prefix followed by the UTF-8 bytes of `s`,
  /// returning the offset of the length word.
  pub fn write_str(&mut self, s: &str) -> Result<StringOffset, RecordTooLarge> {
    let bytes = s.as_bytes();
    if bytes.len() > u16::MAX as usize {
      return Err(RecordTooLarge {
        attempted: bytes.len(),
        limit: u16::MAX as usize,
      });
    }
    self.ensure_capacity(2 + bytes.len())?;
    let offset = self.data.len() as u16;
    self.data.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    self.data.extend_from_slice(bytes);
    Ok(StringOffset::new(offset))
  }

  /// Append the key string, the value (scalar or string), and a field
  /// record describing both. The field record itself is held pending until
  /// `finalize`, so the structured-fields block always trails the data
  /// region's scalar/string writes.
  pub fn write_field(&mut self, key: &str, value: FieldValue<'_>) -> Result<(), RecordTooLarge> {
    let key_offset = self.write_str(key)?;
    let (value_offset, value_tag) = match value {
      FieldValue::Str(v) => (self.write_str(v)?.raw(), FieldTag::Str),
      FieldValue::U8(v) => (self.write(v)?.raw(), FieldTag::U8),
      FieldValue::U16(v) => (self.write(v)?.raw(), FieldTag::U16),
      FieldValue::U32(v) => (self.write(v)?.raw(), FieldTag::U32),
      FieldValue::U64(v) => (self.write(v)?.raw(), FieldTag::U64),
      FieldValue::I8(v) => (self.write(v)?.raw(), FieldTag::I8),
      FieldValue::I16(v) => (self.write(v)?.raw(), FieldTag::I16),
      FieldValue::I32(v) => (self.write(v)?.raw(), FieldTag::I32),
      FieldValue::I64(v) => (self.write(v)?.raw(), FieldTag::I64),
      FieldValue::F32(v) => (self.write(v)?.raw(), FieldTag::F32),
      FieldValue::F64(v) => (self.write(v)?.raw(), FieldTag::F64),
      FieldValue::Bool(v) => (self.write(v)?.raw(), FieldTag::Bool),
    };
    self.pending_fields.push(FieldRecord {
      key: key_offset,
      value_offset,
      value_tag,
    });
    Ok(())
  }

  /// Write the pending field records and the header, making the buffer
  /// read-only. After this call the dispatch tag is non-null (`Record`,
  /// today the only variant) and `visit_fields` can walk the record.
  pub fn finalize(&mut self, dispatch: DispatchTag) -> Result<(), RecordTooLarge> {
    let needed = self.pending_fields.len() * FIELD_RECORD_WIDTH;
    self.ensure_capacity(needed)?;

    let block_index = self.data.len() as u16;
    for field in std::mem::take(&mut self.pending_fields) {
      field.write_le(&mut self.data);
    }
    let block_count = ((self.data.len() as u16).wrapping_sub(block_index)) / FIELD_RECORD_WIDTH as u16;

    self.data[0] = dispatch as u8;
    self.data[1..3].copy_from_slice(&block_index.to_le_bytes());
    self.data[3..5].copy_from_slice(&block_count.to_le_bytes());

    self.finalized = true;
    Ok(())
  }

  fn fields_block(&self) -> (u16, u16) {
    let index = u16::from_le_bytes([self.data[1], self.data[2]]);
    let count = u16::from_le_bytes([self.data[3], self.data[4]]);
    (index, count)
  }

  fn dispatch_tag(&self) -> DispatchTag {
    DispatchTag::from_byte(self.data[0])
  }

  fn read_field_record(&self, at: usize) -> Result<FieldRecord, CorruptRecord> {
    let end = at + FIELD_RECORD_WIDTH;
    if end > self.data.len() {
      return Err(CorruptRecord {
        offset: at as u16,
        region_len: self.data.len(),
      });
    }
    Ok(FieldRecord::read_le(&self.data[at..end]))
  }

  /// Read back a scalar previously written at `offset`.
  pub fn read_scalar<T: Scalar>(&self, offset: ScalarOffset<T>) -> Result<T, CorruptRecord> {
    let start = offset.raw() as usize;
    let end = start + T::WIDTH;
    if end > self.data.len() {
      return Err(CorruptRecord {
        offset: offset.raw(),
        region_len: self.data.len(),
      });
    }
    Ok(T::read_le(&self.data[start..end]))
  }

  /// Read back a string previously written at `offset`.
  pub fn read_string(&self, offset: StringOffset) -> Result<&str, CorruptRecord> {
    let start = offset.raw() as usize;
    if start + 2 > self.data.len() {
      return Err(CorruptRecord {
        offset: offset.raw(),
        region_len: self.data.len(),
      });
    }
    let len = u16::from_le_bytes([self.data[start], self.data[start + 1]]) as usize;
    let data_start = start + 2;
    let data_end = data_start + len;
    if data_end > self.data.len() {
      return Err(CorruptRecord {
        offset: offset.raw(),
        region_len: self.data.len(),
      });
    }
    std::str::from_utf8(&self.data[data_start..data_end]).map_err(|_| CorruptRecord {
      offset: offset.raw(),
      region_len: self.data.len(),
    })
  }

  /// Walk every field in write order, dispatching through the table keyed
  /// by the header's tag.
  pub fn visit_fields(&self, visitor: &mut dyn FieldVisitor) -> Result<(), CorruptRecord> {
    let tag = self.dispatch_tag();
    DISPATCH_TABLE[tag as usize](self, visitor)
  }
}

/// Ergonomic value carrier for [`EventBuffer::write_field`]; mirrors the
/// closed scalar-tag set plus a string variant.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
  Str(&'a str),
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

macro_rules! impl_field_value_from {
  ($ty:ty, $variant:ident) => {
    impl From<$ty> for FieldValue<'_> {
      fn from(value: $ty) -> Self {
        FieldValue::$variant(value)
      }
    }
  };
}

impl_field_value_from!(u8, U8);
impl_field_value_from!(u16, U16);
impl_field_value_from!(u32, U32);
impl_field_value_from!(u64, U64);
impl_field_value_from!(i8, I8);
impl_field_value_from!(i16, I16);
impl_field_value_from!(i32, I32);
impl_field_value_from!(i64, I64);
impl_field_value_from!(f32, F32);
impl_field_value_from!(f64, F64);
impl_field_value_from!(bool, Bool);

impl<'a> From<&'a str> for FieldValue<'a> {
  fn from(value: &'a str) -> Self {
    FieldValue::Str(value)
  }
}

mod __test__;
