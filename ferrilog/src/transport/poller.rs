//! The poller: a dedicated OS thread that drains every registered queue
//! (plus its own internal control queue) in a single pass, then backs off
//! with an escalating idle wait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::error::PollerNotRunning;
use crate::record::Record;
use crate::sink::Sink;

use super::queue::{IdleBackoff, RingBuffer};

type ReplySender = Sender<Result<usize, PollerNotRunning>>;

enum ControlEntry {
  AddQueue {
    id: u64,
    queue: Arc<RingBuffer<Record>>,
    sink: Arc<dyn Sink>,
  },
  RemoveQueue {
    id: u64,
    reply: ReplySender,
  },
  Stop,
}

/// A registered queue's push side, handed back by [`Poller::add_queue`].
/// An [`crate::sink::AsyncSink`] pushes `Record`s through the contained
/// ring buffer; the handle itself is what [`Poller::remove_queue`] takes
/// back.
pub struct QueueHandle {
  id: u64,
  queue: Arc<RingBuffer<Record>>,
}

impl QueueHandle {
  pub fn push(&self, record: Record) {
    self.queue.push(record);
  }
}

/// Owns one dedicated thread that drains registered queues and dispatches
/// records to each queue's wrapped sink.
pub struct Poller {
  control: Arc<RingBuffer<ControlEntry>>,
  running: Arc<AtomicBool>,
  next_id: AtomicU64,
  thread: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
  pub fn new() -> Arc<Self> {
    let control = Arc::new(RingBuffer::new(256));
    let running = Arc::new(AtomicBool::new(true));

    let thread_control = control.clone();
    let thread_running = running.clone();
    let handle = std::thread::Builder::new()
      .name("ferrilog-poller".into())
      .spawn(move || run_poll_loop(thread_control, thread_running))
      .expect("failed to spawn poller thread");

    Arc::new(Self {
      control,
      running,
      next_id: AtomicU64::new(0),
      thread: Mutex::new(Some(handle)),
    })
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::Acquire)
  }

  /// Register a new queue, wired to dispatch every record it receives to
  /// `sink`. Returns the push-side handle.
  pub fn add_queue(&self, capacity: usize, sink: Arc<dyn Sink>) -> QueueHandle {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let queue = Arc::new(RingBuffer::new(capacity));
    self.control.push(ControlEntry::AddQueue {
      id,
      queue: queue.clone(),
      sink,
    });
    QueueHandle { id, queue }
  }

  /// Request/response removal: drains the queue one last time (dispatching
  /// whatever was left to its sink) and reports how many records that
  /// drain processed. Errors if the poller isn't running — otherwise the
  /// caller would block forever waiting on a reply that never comes.
  pub fn remove_queue(&self, handle: QueueHandle) -> Result<usize, PollerNotRunning> {
    if !self.is_running() {
      return Err(PollerNotRunning);
    }
    let (reply, recv) = crossbeam_channel::bounded(1);
    self.control.push(ControlEntry::RemoveQueue { id: handle.id, reply });
    recv.recv().unwrap_or(Err(PollerNotRunning))
  }

  /// Idempotent: pushes a `Stop` entry and joins the thread. A second call
  /// after the thread has already exited is a no-op.
  pub fn stop(&self) {
    if let Some(handle) = self.thread.lock().unwrap().take() {
      self.control.push(ControlEntry::Stop);
      let _ = handle.join();
    }
  }
}

impl Drop for Poller {
  fn drop(&mut self) {
    self.stop();
  }
}

fn run_poll_loop(control: Arc<RingBuffer<ControlEntry>>, running: Arc<AtomicBool>) {
  let mut registered: HashMap<u64, (Arc<RingBuffer<Record>>, Arc<dyn Sink>)> = HashMap::new();
  let mut idle = IdleBackoff::new();

  loop {
    let mut stop_requested = false;
    let mut did_work = false;

    let mut control_batch = Vec::new();
    control.drain_into(&mut control_batch);
    for entry in control_batch {
      did_work = true;
      match entry {
        ControlEntry::AddQueue { id, queue, sink } => {
          registered.insert(id, (queue, sink));
        }
        ControlEntry::RemoveQueue { id, reply } => {
          let residual = if let Some((queue, sink)) = registered.remove(&id) {
            let mut batch = Vec::new();
            queue.drain_into(&mut batch);
            let count = batch.len();
            for record in batch {
              sink.sink(record);
            }
            count
          } else {
            0
          };
          let _ = reply.send(Ok(residual));
        }
        ControlEntry::Stop => stop_requested = true,
      }
    }

    for (queue, sink) in registered.values() {
      let mut batch = Vec::new();
      queue.drain_into(&mut batch);
      if !batch.is_empty() {
        did_work = true;
      }
      for record in batch {
        sink.sink(record);
      }
    }

    if stop_requested {
      break;
    }

    if did_work {
      idle.reset();
    } else {
      idle.snooze();
    }
  }

  running.store(false, Ordering::Release);
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use crate::buffer::event::{DispatchTag, EventBuffer};
  use crate::level::LogLevel;
  use crate::sink::MemorySink;

  fn make_record(i: u32) -> Record {
    let mut buffer = EventBuffer::new();
    let message_offset = buffer.write_str("x").unwrap();
    buffer.write_field("i", crate::buffer::event::FieldValue::U32(i)).unwrap();
    buffer.finalize(DispatchTag::Record).unwrap();
    Record {
      logger: std::sync::Arc::from("t"),
      level: LogLevel::Info,
      timestamp: chrono::Utc::now(),
      thread_id: 0,
      source: None,
      message_offset,
      buffer,
    }
  }

  #[test]
  fn delivers_every_record_in_push_order_then_stops() {
    let poller = Poller::new();
    let sink = Arc::new(MemorySink::new());
    let handle = poller.add_queue(1024, sink.clone());

    for i in 0..2000u32 {
      handle.push(make_record(i));
    }
    poller.stop();

    let records = sink.records();
    assert_eq!(records.len(), 2000);
    for (i, record) in records.iter().enumerate() {
      let mut visitor = crate::buffer::visitor::CollectingVisitor::default();
      record.buffer.visit_fields(&mut visitor).unwrap();
      assert_eq!(
        visitor.fields[0].1,
        crate::buffer::visitor::OwnedFieldValue::U32(i as u32)
      );
    }
  }

  #[test]
  fn stop_is_idempotent() {
    let poller = Poller::new();
    poller.stop();
    poller.stop();
  }

  #[test]
  fn remove_queue_reports_residual_and_drains_to_sink() {
    let poller = Poller::new();
    let sink = Arc::new(MemorySink::new());
    let handle = poller.add_queue(64, sink.clone());
    handle.push(make_record(1));
    handle.push(make_record(2));

    let residual = poller.remove_queue(handle).unwrap();
    assert!(residual <= 2);
    poller.stop();
  }

  #[test]
  fn remove_queue_after_stop_errors() {
    let poller = Poller::new();
    let sink = Arc::new(MemorySink::new());
    let handle = poller.add_queue(64, sink);
    poller.stop();
    assert!(poller.remove_queue(handle).is_err());
  }
}
