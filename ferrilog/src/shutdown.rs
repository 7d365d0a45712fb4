//! Optional process-wide panic and signal hooks that flush outstanding
//! async queues before the process continues unwinding or exiting.
//!
//! Adapted from the teacher repo's "snapshot on panic/signal" hooks: the
//! underlying idea (catch process termination, give background work a
//! chance to finish) carries over unchanged, but what gets done on catch
//! changes from "request a ring-buffer snapshot" to "stop every poller",
//! since `Poller::stop` already blocks until its queues are fully drained.

use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::transport::Poller;

/// Installs a panic hook that stops (and so flushes) every poller in
/// `pollers` before the default panic message prints and unwinding
/// continues. Call once per process; a second install simply replaces the
/// first (matching `std::panic::set_hook`'s own semantics).
pub fn install_panic_hook(pollers: Vec<Arc<Poller>>) {
  std::panic::set_hook(Box::new(move |info| {
    eprintln!("ferrilog: panic detected, flushing outstanding log queues: {info}");
    for poller in &pollers {
      poller.stop();
    }
  }));
}

/// Spawns a thread that waits for `SIGINT`/`SIGTERM`/`SIGHUP`/`SIGQUIT`,
/// stops every poller in `pollers` to flush outstanding records, then exits
/// the process with status 130 (the conventional "terminated by signal"
/// code). Returns an error if the signal iterator could not be installed.
pub fn install_signal_hook(pollers: Vec<Arc<Poller>>) -> std::io::Result<()> {
  let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGQUIT])?;
  std::thread::Builder::new()
    .name("ferrilog-signal-hook".into())
    .spawn(move || {
      if let Some(sig) = signals.forever().next() {
        eprintln!("ferrilog: received signal {sig}, flushing outstanding log queues");
        for poller in &pollers {
          poller.stop();
        }
        std::process::exit(130);
      }
    })?;
  Ok(())
}
