use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrilog::level::LogLevel;
use ferrilog::logger::Logger;
use ferrilog::record::Record;
use ferrilog::sink::MemorySink;
use ferrilog::transport::RingBuffer;

fn sample_records(count: usize) -> Vec<Record> {
  let sink = Arc::new(MemorySink::new());
  let logger = Logger::new("bench.ring_buffer", LogLevel::Trace, sink.clone());
  for i in 0..count {
    logger.info("ring buffer sample record", &[("i", (i as u64).into())]);
  }
  sink.records()
}

fn bench_single_producer(c: &mut Criterion) {
  let mut group = c.benchmark_group("ring_buffer/single_producer_fill_drain");
  for capacity in [64usize, 1024, 8192] {
    let records = sample_records(capacity);
    group.bench_with_input(BenchmarkId::new("capacity", capacity), &capacity, |b, &capacity| {
      b.iter(|| {
        let ring = RingBuffer::new(capacity);
        for record in records.iter().cloned() {
          ring.push(black_box(record));
        }
        while ring.try_pop().is_some() {}
      });
    });
  }
  group.finish();
}

fn bench_contended_producers(c: &mut Criterion) {
  let mut group = c.benchmark_group("ring_buffer/contended_producers");
  for producers in [1usize, 2, 4, 8] {
    let records = sample_records(64);
    group.bench_with_input(BenchmarkId::new("producers", producers), &producers, |b, &producers| {
      b.iter(|| {
        let ring = Arc::new(RingBuffer::new(4096));
        let handles: Vec<_> = (0..producers)
          .map(|_| {
            let ring = ring.clone();
            let records = records.clone();
            thread::spawn(move || {
              for record in records {
                ring.push(record);
              }
            })
          })
          .collect();
        for handle in handles {
          handle.join().unwrap();
        }
        let mut drained = 0usize;
        while ring.try_pop().is_some() {
          drained += 1;
        }
        black_box(drained);
      });
    });
  }
  group.finish();
}

criterion_group!(benches, bench_single_producer, bench_contended_producers);
criterion_main!(benches);
