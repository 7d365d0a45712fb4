//! The rolling file sink: a single open file at a base path that rolls by
//! size and/or time, archiving the previous contents incrementally or by
//! timestamp.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Local, TimeZone, Timelike, Utc};

use crate::error::SinkIOError;
use crate::format::RecordFormatter;
use crate::record::Record;

use super::Sink;

/// Whether a freshly opened file starts empty or keeps existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
  Append,
  Truncate,
}

/// The calendar unit a time-based roll policy measures its interval in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
  Minute,
  Hour,
  Day,
  Month,
  Year,
}

/// How a time-based policy picks its next roll point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRollMode {
  /// `last_roll + interval`.
  Precise,
  /// The smallest calendar boundary of the unit strictly greater than now.
  Round,
}

/// Consulted on every write to decide whether the active file should be
/// rolled. All sub-policies of a [`CompositePolicy`] are consulted on
/// every decision; the composite rolls if any of them fires.
pub trait RollingPolicy: Send + Sync {
  /// `current_len` is the active file's byte length, queried from the
  /// handle's tell-position (concurrent external truncation is not
  /// supported, matching the spec).
  fn should_roll(&self, current_len: u64, now: DateTime<Utc>) -> bool;

  /// Called after a successful roll so time-based policies can compute
  /// their next roll point.
  fn record_roll(&self, now: DateTime<Utc>);
}

/// Roll once the active file reaches `max_bytes`.
pub struct SizePolicy {
  pub max_bytes: u64,
}

impl RollingPolicy for SizePolicy {
  fn should_roll(&self, current_len: u64, _now: DateTime<Utc>) -> bool {
    current_len >= self.max_bytes
  }

  fn record_roll(&self, _now: DateTime<Utc>) {}
}

/// Roll on a time interval, either precisely (`last_roll + interval`) or
/// rounded to the next calendar boundary of the unit.
pub struct TimePolicy {
  unit: TimeUnit,
  mode: TimeRollMode,
  next_roll: Mutex<DateTime<Utc>>,
}

impl TimePolicy {
  pub fn new(unit: TimeUnit, mode: TimeRollMode, now: DateTime<Utc>) -> Self {
    let next_roll = Mutex::new(Self::compute_next(unit, mode, now));
    Self { unit, mode, next_roll }
  }

  fn compute_next(unit: TimeUnit, mode: TimeRollMode, now: DateTime<Utc>) -> DateTime<Utc> {
    match mode {
      TimeRollMode::Precise => now + Self::interval_duration(unit, now),
      TimeRollMode::Round => Self::next_boundary(unit, now),
    }
  }

  fn interval_duration(unit: TimeUnit, at: DateTime<Utc>) -> ChronoDuration {
    match unit {
      TimeUnit::Minute => ChronoDuration::minutes(1),
      TimeUnit::Hour => ChronoDuration::hours(1),
      TimeUnit::Day => ChronoDuration::days(1),
      TimeUnit::Month => {
        let days_in_month = days_in_month(at.year(), at.month());
        ChronoDuration::days(days_in_month as i64)
      }
      TimeUnit::Year => {
        let days = if is_leap_year(at.year()) { 366 } else { 365 };
        ChronoDuration::days(days)
      }
    }
  }

  /// The smallest boundary of `unit` strictly greater than `now`.
  fn next_boundary(unit: TimeUnit, now: DateTime<Utc>) -> DateTime<Utc> {
    match unit {
      TimeUnit::Minute => {
        let base = now.date_naive().and_hms_opt(now.hour(), now.minute(), 0).unwrap();
        Utc.from_utc_datetime(&base) + ChronoDuration::minutes(1)
      }
      TimeUnit::Hour => {
        let base = now.date_naive().and_hms_opt(now.hour(), 0, 0).unwrap();
        Utc.from_utc_datetime(&base) + ChronoDuration::hours(1)
      }
      TimeUnit::Day => {
        let base = now.date_naive().and_hms_opt(0, 0, 0).unwrap();
        Utc.from_utc_datetime(&base) + ChronoDuration::days(1)
      }
      TimeUnit::Month => {
        let (year, month) = if now.month() == 12 { (now.year() + 1, 1) } else { (now.year(), now.month() + 1) };
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
      }
      TimeUnit::Year => Utc.with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0).unwrap(),
    }
  }
}

impl RollingPolicy for TimePolicy {
  fn should_roll(&self, _current_len: u64, now: DateTime<Utc>) -> bool {
    now >= *self.next_roll.lock().unwrap()
  }

  fn record_roll(&self, now: DateTime<Utc>) {
    let mut next = self.next_roll.lock().unwrap();
    *next = Self::compute_next(self.unit, self.mode, now);
  }
}

fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
  match month {
    1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
    4 | 6 | 9 | 11 => 30,
    2 if is_leap_year(year) => 29,
    2 => 28,
    _ => unreachable!("month is always 1..=12"),
  }
}

/// Logically ORs sub-policies: rolls if any fires, and records the roll on
/// all of them.
pub struct CompositePolicy {
  policies: Vec<Box<dyn RollingPolicy>>,
}

impl CompositePolicy {
  pub fn new(policies: Vec<Box<dyn RollingPolicy>>) -> Self {
    Self { policies }
  }
}

impl RollingPolicy for CompositePolicy {
  fn should_roll(&self, current_len: u64, now: DateTime<Utc>) -> bool {
    self.policies.iter().any(|p| p.should_roll(current_len, now))
  }

  fn record_roll(&self, now: DateTime<Utc>) {
    for p in &self.policies {
      p.record_roll(now);
    }
  }
}

/// Performs the rename step that preserves an active file's previous
/// contents under a derived name.
pub trait ArchivePolicy: Send + Sync {
  fn archive(&self, base: &Path, now: DateTime<Utc>) -> Result<(), SinkIOError>;
}

/// `base` -> `base.0`; every existing `base.N` slides to `base.N+1`,
/// starting from the largest existing index going down, so `base.0` is
/// always the most recently archived file.
pub struct IncrementalArchive;

impl IncrementalArchive {
  fn max_existing_index(base: &Path) -> Option<u32> {
    let mut max = None;
    let mut i = 0u32;
    loop {
      if indexed_path(base, i).exists() {
        max = Some(i);
        i += 1;
      } else {
        break;
      }
    }
    max
  }

  fn slide(base: &Path) -> Result<(), SinkIOError> {
    if let Some(max) = Self::max_existing_index(base) {
      let mut i = max;
      loop {
        let from = indexed_path(base, i);
        let to = indexed_path(base, i + 1);
        fs::rename(&from, &to).map_err(|source| SinkIOError::Rename { from, to, source })?;
        if i == 0 {
          break;
        }
        i -= 1;
      }
    }
    Ok(())
  }
}

fn indexed_path(base: &Path, index: u32) -> PathBuf {
  let mut name = base.as_os_str().to_os_string();
  name.push(format!(".{index}"));
  PathBuf::from(name)
}

impl ArchivePolicy for IncrementalArchive {
  fn archive(&self, base: &Path, _now: DateTime<Utc>) -> Result<(), SinkIOError> {
    Self::slide(base)?;
    let target = indexed_path(base, 0);
    fs::rename(base, &target).map_err(|source| SinkIOError::Rename {
      from: base.to_path_buf(),
      to: target,
      source,
    })
  }
}

/// Timezone used to render a timestamped archive name's `STRFTIME` pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampZone {
  Utc,
  Local,
}

/// `base` -> `base.STRFTIME(pattern)`. If that name already exists, the
/// existing file is archived incrementally first (`base.<pattern>.0`, ...)
/// and then the rename proceeds.
pub struct TimestampArchive {
  pattern: String,
  zone: TimestampZone,
}

impl TimestampArchive {
  pub fn new(pattern: impl Into<String>, zone: TimestampZone) -> Self {
    Self { pattern: pattern.into(), zone }
  }

  pub fn with_default_pattern(zone: TimestampZone) -> Self {
    Self::new("%Y%m%d", zone)
  }

  fn rendered_name(&self, base: &Path, now: DateTime<Utc>) -> PathBuf {
    let stamp = match self.zone {
      TimestampZone::Utc => now.format(&self.pattern).to_string(),
      TimestampZone::Local => now.with_timezone(&Local).format(&self.pattern).to_string(),
    };
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{stamp}"));
    PathBuf::from(name)
  }
}

impl ArchivePolicy for TimestampArchive {
  fn archive(&self, base: &Path, now: DateTime<Utc>) -> Result<(), SinkIOError> {
    let target = self.rendered_name(base, now);
    if target.exists() {
      IncrementalArchive::slide(&target)?;
      let collided_into = indexed_path(&target, 0);
      fs::rename(&target, &collided_into).map_err(|source| SinkIOError::Rename {
        from: target.clone(),
        to: collided_into,
        source,
      })?;
    }
    fs::rename(base, &target).map_err(|source| SinkIOError::Rename {
      from: base.to_path_buf(),
      to: target,
      source,
    })
  }
}

struct OpenFile {
  handle: File,
}

/// A sink that writes formatted records to a file which rolls and archives
/// according to its policies.
///
/// The roll check, archive, and reopen all happen under the same mutex
/// that guards writes, so no writer can ever observe a partially rolled
/// state.
pub struct RollingFileSink<F: RecordFormatter> {
  base_path: PathBuf,
  open_mode: OpenMode,
  roll_policy: Box<dyn RollingPolicy>,
  archive_policy: Box<dyn ArchivePolicy>,
  formatter: F,
  state: Mutex<Option<OpenFile>>,
  dropped: AtomicU64,
  degraded: AtomicBool,
  write_errors: AtomicU64,
  last_write_error: Mutex<Option<Arc<SinkIOError>>>,
}

impl<F: RecordFormatter> RollingFileSink<F> {
  pub fn open(
    base_path: impl Into<PathBuf>,
    open_mode: OpenMode,
    roll_policy: Box<dyn RollingPolicy>,
    archive_policy: Box<dyn ArchivePolicy>,
    formatter: F,
  ) -> Result<Self, SinkIOError> {
    let base_path = base_path.into();
    let handle = open_with_mode(&base_path, open_mode)?;
    Ok(Self {
      base_path,
      open_mode,
      roll_policy,
      archive_policy,
      formatter,
      state: Mutex::new(Some(OpenFile { handle })),
      dropped: AtomicU64::new(0),
      degraded: AtomicBool::new(false),
      write_errors: AtomicU64::new(0),
      last_write_error: Mutex::new(None),
    })
  }

  /// Number of records dropped because the sink is in a degraded state
  /// (the file could not be reopened after a roll). Distinct from
  /// [`Self::write_error_count`], which counts failures while the file was
  /// open and writable.
  pub fn dropped_count(&self) -> u64 {
    self.dropped.load(Ordering::Relaxed)
  }

  pub fn is_degraded(&self) -> bool {
    self.degraded.load(Ordering::Relaxed)
  }

  /// Number of `SinkIOError::Write` failures seen so far. Each one means a
  /// record was lost: the error never propagates to the logger that
  /// produced it (§7), it only accumulates here.
  pub fn write_error_count(&self) -> u64 {
    self.write_errors.load(Ordering::Relaxed)
  }

  /// The sink's error channel: the most recent write failure, if any.
  pub fn last_write_error(&self) -> Option<Arc<SinkIOError>> {
    self.last_write_error.lock().unwrap().clone()
  }

  fn record_write_error(&self, err: SinkIOError) {
    self.write_errors.fetch_add(1, Ordering::Relaxed);
    *self.last_write_error.lock().unwrap() = Some(Arc::new(err));
  }

  fn reopen(&self, guard: &mut Option<OpenFile>) -> Result<(), SinkIOError> {
    match open_with_mode(&self.base_path, self.open_mode) {
      Ok(handle) => {
        *guard = Some(OpenFile { handle });
        self.degraded.store(false, Ordering::Relaxed);
        Ok(())
      }
      Err(err) => {
        *guard = None;
        self.degraded.store(true, Ordering::Relaxed);
        Err(err)
      }
    }
  }

  fn roll_if_needed(&self, guard: &mut Option<OpenFile>, now: DateTime<Utc>) {
    let Some(open) = guard.as_mut() else {
      // Already degraded; a retry happens on every write.
      let _ = self.reopen(guard);
      return;
    };

    let current_len = match open.handle.seek(SeekFrom::Current(0)) {
      Ok(len) => len,
      Err(_) => return,
    };

    if !self.roll_policy.should_roll(current_len, now) {
      return;
    }

    // Drop the handle before renaming so the OS sees the file fully closed.
    *guard = None;
    match self.archive_policy.archive(&self.base_path, now) {
      Ok(()) => {
        self.roll_policy.record_roll(now);
      }
      Err(_) => {
        // Rename failed: keep writing to the un-rolled file (reopen below
        // reopens the same base path, which still holds the old content).
      }
    }
    let _ = self.reopen(guard);
  }
}

fn open_with_mode(path: &Path, mode: OpenMode) -> Result<File, SinkIOError> {
  if let Some(parent) = path.parent() {
    if !parent.as_os_str().is_empty() {
      let _ = fs::create_dir_all(parent);
    }
  }
  let mut options = OpenOptions::new();
  options.create(true).write(true);
  match mode {
    OpenMode::Append => options.append(true),
    OpenMode::Truncate => options.truncate(true),
  };
  options.open(path).map_err(|source| SinkIOError::Open {
    path: path.to_path_buf(),
    source,
  })
}

impl<F: RecordFormatter> Sink for RollingFileSink<F> {
  fn sink(&self, record: Record) {
    let mut rendered = String::new();
    self.formatter.format(&record, &mut rendered);
    rendered.push('\n');

    let mut guard = self.state.lock().unwrap();
    self.roll_if_needed(&mut guard, record.timestamp);

    match guard.as_mut() {
      Some(open) => {
        if let Err(source) = open.handle.write_all(rendered.as_bytes()) {
          self.record_write_error(SinkIOError::Write {
            path: self.base_path.clone(),
            source,
          });
        }
      }
      None => {
        self.dropped.fetch_add(1, Ordering::Relaxed);
      }
    }
  }

  fn flush(&self) {
    if let Some(open) = self.state.lock().unwrap().as_mut() {
      let _ = open.handle.flush();
    }
  }
}
