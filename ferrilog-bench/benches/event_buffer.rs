use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrilog::buffer::event::{DispatchTag, FieldValue};
use ferrilog::buffer::EventBuffer;

fn bench_scalar_writes(c: &mut Criterion) {
  c.bench_function("event_buffer/write_u64", |b| {
    b.iter(|| {
      let mut buffer = EventBuffer::new();
      for i in 0..8u64 {
        black_box(buffer.write(i).unwrap());
      }
    });
  });
}

fn bench_message_and_fields(c: &mut Criterion) {
  let mut group = c.benchmark_group("event_buffer/build_record");
  for field_count in [0usize, 3, 8] {
    group.bench_with_input(BenchmarkId::new("fields", field_count), &field_count, |b, &field_count| {
      b.iter(|| {
        let mut buffer = EventBuffer::new();
        buffer.write_str("distributed event from worker").unwrap();
        for i in 0..field_count {
          buffer
            .write_field(black_box("worker_id"), FieldValue::from(i as u64))
            .unwrap();
        }
        buffer.finalize(DispatchTag::Record).unwrap();
        black_box(buffer);
      });
    });
  }
  group.finish();
}

fn bench_visit_fields(c: &mut Criterion) {
  use ferrilog::buffer::CollectingVisitor;

  let mut buffer = EventBuffer::new();
  buffer.write_str("visited record").unwrap();
  for i in 0..8u64 {
    buffer.write_field("field", FieldValue::from(i)).unwrap();
  }
  buffer.finalize(DispatchTag::Record).unwrap();

  c.bench_function("event_buffer/visit_fields", |b| {
    b.iter(|| {
      let mut visitor = CollectingVisitor::default();
      buffer.visit_fields(&mut visitor).unwrap();
      black_box(visitor);
    });
  });
}

criterion_group!(benches, bench_scalar_writes, bench_message_and_fields, bench_visit_fields);
criterion_main!(benches);
