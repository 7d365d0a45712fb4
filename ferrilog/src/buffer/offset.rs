//! Typed offsets into an [`super::event::EventBuffer`]'s data region.
//!
//! An offset is a `u16` index, never a pointer: the buffer is free to move
//! or grow from inline to heap storage without invalidating anything
//! produced by an earlier `write`.

use std::marker::PhantomData;

use super::Bytes;

/// A scalar primitive that can be written little-endian into the data
/// region and read back out of it. The set is closed by design — see the
/// crate's non-goals around adding new field types at runtime.
pub trait Scalar: Copy + Sized + 'static {
  const TAG: ScalarTag;
  const WIDTH: usize;

  fn write_le(self, out: &mut Bytes);
  fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
  ($ty:ty, $tag:ident) => {
    impl Scalar for $ty {
      const TAG: ScalarTag = ScalarTag::$tag;
      const WIDTH: usize = std::mem::size_of::<$ty>();

      fn write_le(self, out: &mut Bytes) {
        out.extend_from_slice(&self.to_le_bytes());
      }

      fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; std::mem::size_of::<$ty>()];
        buf.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
        Self::from_le_bytes(buf)
      }
    }
  };
}

impl_scalar!(u8, U8);
impl_scalar!(u16, U16);
impl_scalar!(u32, U32);
impl_scalar!(u64, U64);
impl_scalar!(i8, I8);
impl_scalar!(i16, I16);
impl_scalar!(i32, I32);
impl_scalar!(i64, I64);
impl_scalar!(f32, F32);
impl_scalar!(f64, F64);

impl Scalar for bool {
  const TAG: ScalarTag = ScalarTag::Bool;
  const WIDTH: usize = 1;

  fn write_le(self, out: &mut Bytes) {
    out.push(self as u8);
  }

  fn read_le(bytes: &[u8]) -> Self {
    bytes[0] != 0
  }
}

/// Closed set of value types a field or a bare scalar write can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScalarTag {
  U8 = 0,
  U16 = 1,
  U32 = 2,
  U64 = 3,
  I8 = 4,
  I16 = 5,
  I32 = 6,
  I64 = 7,
  F32 = 8,
  F64 = 9,
  Bool = 10,
}

/// A field's value type, the scalar tags plus a string variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldTag {
  U8 = 0,
  U16 = 1,
  U32 = 2,
  U64 = 3,
  I8 = 4,
  I16 = 5,
  I32 = 6,
  I64 = 7,
  F32 = 8,
  F64 = 9,
  Bool = 10,
  Str = 11,
}

impl FieldTag {
  pub(crate) fn from_byte(byte: u8) -> Self {
    match byte {
      0 => FieldTag::U8,
      1 => FieldTag::U16,
      2 => FieldTag::U32,
      3 => FieldTag::U64,
      4 => FieldTag::I8,
      5 => FieldTag::I16,
      6 => FieldTag::I32,
      7 => FieldTag::I64,
      8 => FieldTag::F32,
      9 => FieldTag::F64,
      10 => FieldTag::Bool,
      11 => FieldTag::Str,
      other => panic!("corrupt field tag byte: {other}"),
    }
  }
}

impl From<ScalarTag> for FieldTag {
  fn from(tag: ScalarTag) -> Self {
    FieldTag::from_byte(tag as u8)
  }
}

/// Offset of a scalar value written by `EventBuffer::write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarOffset<T> {
  pub(crate) offset: u16,
  _marker: PhantomData<T>,
}

impl<T> ScalarOffset<T> {
  pub(crate) fn new(offset: u16) -> Self {
    Self {
      offset,
      _marker: PhantomData,
    }
  }

  pub fn raw(self) -> u16 {
    self.offset
  }
}

/// Offset of a length-prefixed UTF-8 blob written by `EventBuffer::write_str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringOffset {
  pub(crate) offset: u16,
}

impl StringOffset {
  pub(crate) fn new(offset: u16) -> Self {
    Self { offset }
  }

  pub fn raw(self) -> u16 {
    self.offset
  }
}

/// Location of the structured-fields block: index of the first field
/// record, plus the number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldsBlockOffset {
  pub(crate) index: u16,
  pub(crate) count: u16,
}

impl FieldsBlockOffset {
  pub fn count(self) -> u16 {
    self.count
  }
}

/// A written field: a key/value pair with a closed-set value type, stored
/// by offset rather than by pointer so the record stays relocatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldRecord {
  pub key: StringOffset,
  pub value_offset: u16,
  pub value_tag: FieldTag,
}

pub(crate) const FIELD_RECORD_WIDTH: usize = 5; // u16 + u16 + u8

impl FieldRecord {
  pub(crate) fn write_le(self, out: &mut Bytes) {
    out.extend_from_slice(&self.key.offset.to_le_bytes());
    out.extend_from_slice(&self.value_offset.to_le_bytes());
    out.push(self.value_tag as u8);
  }

  pub(crate) fn read_le(bytes: &[u8]) -> Self {
    let key = u16::from_le_bytes([bytes[0], bytes[1]]);
    let value_offset = u16::from_le_bytes([bytes[2], bytes[3]]);
    let value_tag = FieldTag::from_byte(bytes[4]);
    FieldRecord {
      key: StringOffset::new(key),
      value_offset,
      value_tag,
    }
  }
}
