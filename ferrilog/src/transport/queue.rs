//! A bounded, lock-free multi-producer single-consumer ring buffer.
//!
//! This is the classic Vyukov bounded queue: each slot carries its own
//! sequence number, so a producer/consumer never needs to touch a shared
//! head/tail pair with a CAS loop across the whole buffer — only the
//! claimed slot's sequence is contended. Capacity is rounded up to the
//! next power of two so indexing is a mask instead of a modulus.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam_utils::Backoff;

struct Slot<T> {
  sequence: AtomicUsize,
  value: UnsafeCell<MaybeUninit<T>>,
}

/// Bounded ring buffer with blocking (spin-escalating) push and
/// non-blocking pop. Safe for any number of producers; `pop` is documented
/// single-consumer (the poller is the only reader).
pub struct RingBuffer<T> {
  mask: usize,
  buffer: Box<[Slot<T>]>,
  enqueue_pos: AtomicUsize,
  dequeue_pos: AtomicUsize,
}

unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
  /// `capacity` is rounded up to the next power of two (minimum 2).
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(2).next_power_of_two();
    let buffer: Box<[Slot<T>]> = (0..capacity)
      .map(|i| Slot {
        sequence: AtomicUsize::new(i),
        value: UnsafeCell::new(MaybeUninit::uninit()),
      })
      .collect();

    Self {
      mask: capacity - 1,
      buffer,
      enqueue_pos: AtomicUsize::new(0),
      dequeue_pos: AtomicUsize::new(0),
    }
  }

  pub fn capacity(&self) -> usize {
    self.mask + 1
  }

  /// Attempt to enqueue without blocking. `Err(item)` hands the item back
  /// if the buffer is currently full.
  pub fn try_push(&self, item: T) -> Result<(), T> {
    let mut pos = self.enqueue_pos.load(Ordering::Relaxed);
    loop {
      let slot = &self.buffer[pos & self.mask];
      let seq = slot.sequence.load(Ordering::Acquire);
      let diff = seq as isize - pos as isize;

      if diff == 0 {
        match self
          .enqueue_pos
          .compare_exchange_weak(pos, pos + 1, Ordering::Relaxed, Ordering::Relaxed)
        {
          Ok(_) => {
            unsafe {
              (*slot.value.get()).write(item);
            }
            slot.sequence.store(pos + 1, Ordering::Release);
            return Ok(());
          }
          Err(current) => pos = current,
        }
      } else if diff < 0 {
        return Err(item);
      } else {
        pos = self.enqueue_pos.load(Ordering::Relaxed);
      }
    }
  }

  /// Enqueue, blocking the caller with an escalating spin-wait
  /// (busy spin -> yield -> `sleep(0)` -> `sleep(1ms)`) while the buffer is
  /// full. There is no drop-on-full in the core transport.
  pub fn push(&self, mut item: T) {
    let mut backoff = IdleBackoff::new();
    loop {
      match self.try_push(item) {
        Ok(()) => return,
        Err(rejected) => {
          item = rejected;
          backoff.snooze();
        }
      }
    }
  }

  /// Single-consumer pop: returns `None` if the buffer is currently empty.
  pub fn try_pop(&self) -> Option<T> {
    let mut pos = self.dequeue_pos.load(Ordering::Relaxed);
    loop {
      let slot = &self.buffer[pos & self.mask];
      let seq = slot.sequence.load(Ordering::Acquire);
      let diff = seq as isize - (pos + 1) as isize;

      if diff == 0 {
        match self
          .dequeue_pos
          .compare_exchange_weak(pos, pos + 1, Ordering::Relaxed, Ordering::Relaxed)
        {
          Ok(_) => {
            let value = unsafe { (*slot.value.get()).assume_init_read() };
            slot.sequence.store(pos + self.mask + 1, Ordering::Release);
            return Some(value);
          }
          Err(current) => pos = current,
        }
      } else if diff < 0 {
        return None;
      } else {
        pos = self.dequeue_pos.load(Ordering::Relaxed);
      }
    }
  }

  /// Approximate number of items currently queued. Exact only when there
  /// is no concurrent producer/consumer activity.
  pub fn len(&self) -> usize {
    let enq = self.enqueue_pos.load(Ordering::Relaxed);
    let deq = self.dequeue_pos.load(Ordering::Relaxed);
    enq.saturating_sub(deq)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Drain every item currently available, in FIFO order.
  pub fn drain_into(&self, out: &mut Vec<T>) {
    while let Some(item) = self.try_pop() {
      out.push(item);
    }
  }
}

impl<T> Drop for RingBuffer<T> {
  fn drop(&mut self) {
    while self.try_pop().is_some() {}
  }
}

/// The poller's idle wait and a blocking producer's full-queue wait: cheap
/// spinning escalating to yielding (via crossbeam's `Backoff`), and once
/// that gives up on busy-waiting, a `sleep(1ms)` floor so neither a stalled
/// poller nor a stalled producer burns a core indefinitely.
pub(crate) struct IdleBackoff {
  inner: Backoff,
}

impl IdleBackoff {
  pub(crate) fn new() -> Self {
    Self { inner: Backoff::new() }
  }

  pub(crate) fn snooze(&mut self) {
    if self.inner.is_completed() {
      std::thread::sleep(Duration::from_millis(1));
    } else {
      self.inner.snooze();
    }
  }

  pub(crate) fn reset(&mut self) {
    self.inner.reset();
  }
}

#[cfg(test)]
mod __test__ {
  use super::*;
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn capacity_rounds_up_to_power_of_two() {
    let q: RingBuffer<u32> = RingBuffer::new(5);
    assert_eq!(q.capacity(), 8);
  }

  #[test]
  fn push_pop_preserves_fifo_order() {
    let q: RingBuffer<u32> = RingBuffer::new(4);
    for i in 0..4 {
      q.push(i);
    }
    for i in 0..4 {
      assert_eq!(q.try_pop(), Some(i));
    }
    assert_eq!(q.try_pop(), None);
  }

  #[test]
  fn blocks_until_consumer_makes_room() {
    let q = Arc::new(RingBuffer::<u32>::new(2));
    for i in 0..2 {
      q.push(i);
    }
    assert!(q.try_push(99).is_err());

    let q2 = q.clone();
    let handle = thread::spawn(move || {
      q2.push(2);
    });

    thread::sleep(Duration::from_millis(5));
    assert_eq!(q.try_pop(), Some(0));
    handle.join().unwrap();

    let mut remaining = Vec::new();
    q.drain_into(&mut remaining);
    assert_eq!(remaining, vec![1, 2]);
  }

  #[test]
  fn single_producer_multi_thread_preserves_each_threads_program_order() {
    let q = Arc::new(RingBuffer::<(u32, u32)>::new(64));
    let mut handles = Vec::new();
    for t in 0..4u32 {
      let q = q.clone();
      handles.push(thread::spawn(move || {
        for i in 0..100u32 {
          q.push((t, i));
        }
      }));
    }
    for h in handles {
      h.join().unwrap();
    }

    let mut drained = Vec::new();
    q.drain_into(&mut drained);
    assert_eq!(drained.len(), 400);

    let mut last_seen = [None; 4];
    for (t, i) in drained {
      if let Some(last) = last_seen[t as usize] {
        assert!(i > last, "program order violated for thread {t}");
      }
      last_seen[t as usize] = Some(i);
    }
  }
}
