//! Runnable ferrilog examples: macro logging against the process-wide
//! default registry, a manual logger over an in-memory sink, pattern
//! formatting, TOML-driven configuration with a rolling file sink, and the
//! async transport end to end.

use std::sync::Arc;

use ferrilog::format::PatternFormatter;
use ferrilog::level::LogLevel;
use ferrilog::logger::Logger;
use ferrilog::record::Record;
use ferrilog::sink::{AsyncSink, MemorySink};
use ferrilog::transport::Poller;
use ferrilog::{config, shutdown, Registry};

fn example_macro_logging() {
  println!("=== Example 1: macro logging against the default registry ===");

  ferrilog_macros::info!("application started");
  ferrilog_macros::warning!("cache miss", "key" = "user:42");
  ferrilog_macros::error!("request failed", "status" = 500u32, "retryable" = true);

  println!();
}

fn example_manual_logger_and_memory_sink() {
  println!("=== Example 2: a logger wired directly to a MemorySink ===");

  let sink = Arc::new(MemorySink::new());
  let logger = Logger::new("demo.orders", LogLevel::Debug, sink.clone());

  logger.info(
    "order placed",
    &[("order_id", 1024u64.into()), ("total_cents", 4599u64.into())],
  );
  logger.debug("computed shipping estimate", &[("days", 3u8.into())]);

  for record in sink.records() {
    println!("  captured: [{}] {}", record.level, record.message());
  }
  println!();
}

fn example_pattern_formatter() {
  println!("=== Example 3: the pattern formatter ===");

  let sink = Arc::new(MemorySink::new());
  let logger = Logger::new("demo.pattern", LogLevel::Info, sink.clone());
  logger.info("checkout completed", &[("cart_items", 3u32.into())]);

  let formatter = PatternFormatter::new("%H:%M:%S [%l] %n: %v (%f)").expect("pattern compiles");
  let record: &Record = &sink.records()[0];
  println!("  {}", formatter.format_to_string(record));
  println!();
}

fn example_configured_from_toml() {
  println!("=== Example 4: configuring loggers and sinks from app.toml ===");

  std::env::set_var("FERRILOG_DEMO_DIR", env!("CARGO_MANIFEST_DIR"));
  let source = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/app.toml")).expect("config/app.toml is present next to Cargo.toml");

  let registry = Registry::new();
  config::configure(&source, &registry, true).expect("app.toml is a valid configuration");

  let checkout = registry.get("shop.checkout");
  checkout.info("checkout started", &[("cart_id", 7u32.into())]);
  checkout.debug("applied promo code", &[("code", "SUMMER10".into())]);
  checkout.flush();

  let log_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tmp/checkout.log");
  if let Ok(contents) = std::fs::read_to_string(&log_path) {
    println!("  {} now contains:", log_path.display());
    for line in contents.lines() {
      println!("    {line}");
    }
  }
  println!();
}

fn example_async_transport() {
  println!("=== Example 5: the async transport (poller + queue) ===");

  let poller = Poller::new();
  let memory = Arc::new(MemorySink::new());
  let async_sink: Arc<dyn ferrilog::sink::Sink> = Arc::new(AsyncSink::new(poller.clone(), 1024, memory.clone()));
  let logger = Logger::new("demo.async", LogLevel::Info, async_sink);

  for i in 0..10_000u32 {
    logger.info("queued record", &[("i", i.into())]);
  }
  poller.stop();

  println!("  poller delivered {} records", memory.len());
  println!();
}

fn example_graceful_shutdown() {
  println!("=== Example 6: wiring a panic hook to a poller ===");

  let poller = Poller::new();
  shutdown::install_panic_hook(vec![poller.clone()]);
  println!("  panic hook installed; it will stop {} active poller(s) on panic", 1);
  poller.stop();
  println!();
}

fn main() {
  example_macro_logging();
  example_manual_logger_and_memory_sink();
  example_pattern_formatter();
  example_configured_from_toml();
  example_async_transport();
  example_graceful_shutdown();
}
