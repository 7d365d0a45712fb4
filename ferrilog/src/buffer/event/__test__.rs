#[cfg(test)]
mod __test__ {
  use crate::buffer::event::{DispatchTag, EventBuffer, FieldValue};
  use crate::buffer::visitor::{CollectingVisitor, FieldVisitor, OwnedFieldValue};

  #[test]
  fn round_trips_scalars_and_strings() {
    let mut buf = EventBuffer::new();
    let ts = buf.write(1_700_000_000u64).unwrap();
    let thread = buf.write(42u32).unwrap();
    let text = buf.write_str("hello world").unwrap();
    buf.finalize(DispatchTag::Record).unwrap();

    assert_eq!(buf.read_scalar(ts).unwrap(), 1_700_000_000u64);
    assert_eq!(buf.read_scalar(thread).unwrap(), 42u32);
    assert_eq!(buf.read_string(text).unwrap(), "hello world");
  }

  #[test]
  fn visit_fields_preserves_write_order_and_types() {
    let mut buf = EventBuffer::new();
    buf.write_field("test_name", FieldValue::Str("should_format_fields")).unwrap();
    buf.write_field("test_success", FieldValue::Bool(true)).unwrap();
    buf.write_field("count", FieldValue::U32(7)).unwrap();
    buf.finalize(DispatchTag::Record).unwrap();

    let mut visitor = CollectingVisitor::default();
    buf.visit_fields(&mut visitor).unwrap();

    assert_eq!(visitor.fields.len(), 3);
    assert_eq!(visitor.fields[0].0, "test_name");
    assert_eq!(visitor.fields[0].1, OwnedFieldValue::Str("should_format_fields".into()));
    assert_eq!(visitor.fields[1].1, OwnedFieldValue::Bool(true));
    assert_eq!(visitor.fields[2].1, OwnedFieldValue::U32(7));
  }

  #[test]
  fn offsets_survive_growth_from_inline_to_heap() {
    let mut buf = EventBuffer::new();
    assert!(!buf.is_heap_allocated());

    let first = buf.write_str("small").unwrap();
    // Push the buffer well past the 255-byte inline capacity.
    let mut offsets = Vec::new();
    for i in 0..100u32 {
      offsets.push((i, buf.write(i).unwrap()));
    }
    assert!(buf.is_heap_allocated());

    assert_eq!(buf.read_string(first).unwrap(), "small");
    for (expected, offset) in offsets {
      assert_eq!(buf.read_scalar(offset).unwrap(), expected);
    }
  }

  #[test]
  fn clone_preserves_offsets() {
    let mut buf = EventBuffer::new();
    let off = buf.write(99u64).unwrap();
    buf.finalize(DispatchTag::Record).unwrap();

    let cloned = buf.clone();
    assert_eq!(cloned.read_scalar(off).unwrap(), 99u64);
  }

  #[test]
  fn record_too_large_is_rejected() {
    let mut buf = EventBuffer::new();
    let huge = "a".repeat(u16::MAX as usize);
    // First one barely fits (header is only 5 bytes plus a 2-byte length prefix).
    assert!(buf.write_str(&huge).is_err());
  }

  #[test]
  fn reading_past_the_data_region_is_corrupt_record() {
    use crate::buffer::offset::ScalarOffset;

    let buf = EventBuffer::new();
    let bogus: ScalarOffset<u32> = ScalarOffset::new(9000);
    assert!(buf.read_scalar(bogus).is_err());
  }
}
