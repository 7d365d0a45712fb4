use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrilog::format::LogfmtFormatter;
use ferrilog::level::LogLevel;
use ferrilog::logger::Logger;
use ferrilog::sink::rolling_file::{ArchivePolicy, IncrementalArchive, OpenMode, RollingFileSink, SizePolicy};
use ferrilog::sink::Sink;

fn bench_writes_without_rolling(c: &mut Criterion) {
  let dir = tempfile::tempdir().unwrap();
  let base_path = dir.path().join("service.log");
  let sink: Arc<dyn Sink> = Arc::new(
    RollingFileSink::open(
      base_path.clone(),
      OpenMode::Append,
      Box::new(SizePolicy { max_bytes: u64::MAX }),
      Box::new(IncrementalArchive) as Box<dyn ArchivePolicy>,
      LogfmtFormatter::standard(),
    )
    .unwrap(),
  );
  let logger = Logger::new("bench.rolling_file", LogLevel::Trace, sink.clone());

  c.bench_function("rolling_file_sink/write_no_roll", |b| {
    b.iter(|| {
      logger.info(black_box("steady-state write"), &[("n", 1u32.into())]);
    });
  });
}

fn bench_writes_with_rolling(c: &mut Criterion) {
  let mut group = c.benchmark_group("rolling_file_sink/write_and_roll");
  for max_bytes in [256u64, 4096] {
    group.bench_with_input(BenchmarkId::new("max_bytes", max_bytes), &max_bytes, |b, &max_bytes| {
      let dir = tempfile::tempdir().unwrap();
      let base_path = dir.path().join("service.log");
      let sink: Arc<dyn Sink> = Arc::new(
        RollingFileSink::open(
          base_path.clone(),
          OpenMode::Append,
          Box::new(SizePolicy { max_bytes }),
          Box::new(IncrementalArchive) as Box<dyn ArchivePolicy>,
          LogfmtFormatter::standard(),
        )
        .unwrap(),
      );
      let logger = Logger::new("bench.rolling_file", LogLevel::Trace, sink.clone());

      b.iter(|| {
        for i in 0..64u32 {
          logger.info(black_box("record that rolls the active file repeatedly"), &[("i", i.into())]);
        }
      });
    });
  }
  group.finish();
}

criterion_group!(benches, bench_writes_without_rolling, bench_writes_with_rolling);
criterion_main!(benches);
