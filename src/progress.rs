//! Progress reporting and cooperative cancellation.
//!
//! Long-running operations poll a [`ProgressCallback`] at most once per
//! throttle interval (40 ms by default) and at every buffer-sized chunk. A
//! callback returning `false` aborts the operation with
//! [`Error::Cancelled`](crate::Error::Cancelled).
//!
//! Each session may carry its own callback. Sessions without one fall back to
//! a process-wide default installed once with [`set_default_callback`].
//!
//! # Example
//!
//! ```rust,no_run
//! use smpa::progress::ProgressAmount;
//! use smpa::{ArchiveReader, OpenMode, SessionOptions};
//!
//! let options = SessionOptions::new().callback(|name: Option<&str>, amount: ProgressAmount| {
//!     if let Some(name) = name {
//!         println!("{}", name);
//!     }
//!     println!("{:?}", amount);
//!     true // keep going
//! });
//! let reader = ArchiveReader::open_path_with("data.smpa", OpenMode::List, options)?;
//! # Ok::<(), smpa::Error>(())
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Default minimum time between two throttled callback invocations (25 Hz).
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(40);

/// The quantity passed with a progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAmount {
    /// Bytes processed since the previous notification.
    Bytes(u64),
    /// Overall completion in percent (0-100).
    Percent(u8),
}

impl ProgressAmount {
    /// Encodes the amount as the signed value hosts expect.
    ///
    /// Byte counts are clamped to `i32::MAX`; percentages are negated.
    pub fn to_host(self) -> i32 {
        match self {
            ProgressAmount::Bytes(n) => i32::try_from(n).unwrap_or(i32::MAX),
            ProgressAmount::Percent(p) => -i32::from(p.min(100)),
        }
    }

    /// Decodes a host value produced by [`to_host`](Self::to_host).
    pub fn from_host(value: i32) -> Self {
        if value < 0 {
            ProgressAmount::Percent(value.unsigned_abs().min(100) as u8)
        } else {
            ProgressAmount::Bytes(value as u64)
        }
    }
}

/// Receives progress notifications.
pub trait ProgressCallback: Send {
    /// Called with an optional file name and an amount.
    ///
    /// Returns `true` to continue or `false` to request cancellation.
    fn on_progress(&mut self, file_name: Option<&str>, amount: ProgressAmount) -> bool;
}

impl<F> ProgressCallback for F
where
    F: FnMut(Option<&str>, ProgressAmount) -> bool + Send,
{
    fn on_progress(&mut self, file_name: Option<&str>, amount: ProgressAmount) -> bool {
        self(file_name, amount)
    }
}

/// A progress callback that ignores notifications and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&mut self, _file_name: Option<&str>, _amount: ProgressAmount) -> bool {
        true
    }
}

/// A thread-safe progress sink with an external cancel switch.
///
/// Share it with [`AtomicProgress::shared`] and pass a clone as the session
/// callback; another thread may read counters or call
/// [`cancel`](Self::cancel).
#[derive(Debug, Default)]
pub struct AtomicProgress {
    bytes: AtomicU64,
    percent: AtomicU64,
    notifications: AtomicU64,
    cancelled: AtomicBool,
}

impl AtomicProgress {
    /// Creates a new atomic progress sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shared atomic progress sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the sum of all byte amounts reported.
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Returns the most recent percentage reported.
    pub fn percent(&self) -> u64 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Returns how many notifications were delivered.
    pub fn notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }

    /// Requests cancellation at the next notification.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for Arc<AtomicProgress> {
    fn on_progress(&mut self, _file_name: Option<&str>, amount: ProgressAmount) -> bool {
        self.notifications.fetch_add(1, Ordering::Relaxed);
        match amount {
            ProgressAmount::Bytes(n) => {
                self.bytes.fetch_add(n, Ordering::Relaxed);
            }
            ProgressAmount::Percent(p) => self.percent.store(u64::from(p), Ordering::Relaxed),
        }
        !self.is_cancelled()
    }
}

type DefaultCallback = Box<dyn Fn(Option<&str>, ProgressAmount) -> bool + Send + Sync>;

static DEFAULT_CALLBACK: OnceLock<DefaultCallback> = OnceLock::new();

/// Installs the process-wide fallback callback.
///
/// The default may be set only once per process; it serves sessions that
/// have no callback of their own. Returns `false` if a default was already
/// installed, in which case `callback` is dropped.
pub fn set_default_callback<F>(callback: F) -> bool
where
    F: Fn(Option<&str>, ProgressAmount) -> bool + Send + Sync + 'static,
{
    DEFAULT_CALLBACK.set(Box::new(callback)).is_ok()
}

/// Returns whether a process-wide default callback is installed.
pub fn has_default_callback() -> bool {
    DEFAULT_CALLBACK.get().is_some()
}

/// Computes a rounded percentage of `number` out of `count`, capped at 100.
pub fn percent(number: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    let value = (u128::from(number) * 100 + u128::from(count) / 2) / u128::from(count);
    value.min(100) as u8
}

/// Throttled progress state owned by one session.
pub struct Progress {
    callback: Option<Box<dyn ProgressCallback>>,
    interval: Duration,
    last_tick: Option<Instant>,
    pending_bytes: u64,
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("has_callback", &self.callback.is_some())
            .field("interval", &self.interval)
            .field("pending_bytes", &self.pending_bytes)
            .finish_non_exhaustive()
    }
}

impl Progress {
    /// Creates progress state with an optional session callback.
    pub fn new(callback: Option<Box<dyn ProgressCallback>>, interval: Duration) -> Self {
        Self {
            callback,
            interval,
            last_tick: None,
            pending_bytes: 0,
        }
    }

    /// Replaces the session callback.
    pub fn set_callback(&mut self, callback: Option<Box<dyn ProgressCallback>>) {
        self.callback = callback;
    }

    /// Counts bytes toward the next byte notification.
    #[inline]
    pub fn add_bytes(&mut self, n: u64) {
        self.pending_bytes = self.pending_bytes.saturating_add(n);
    }

    /// Returns bytes counted since the last byte notification.
    pub fn pending_bytes(&self) -> u64 {
        self.pending_bytes
    }

    fn due(&self) -> bool {
        self.last_tick
            .is_none_or(|last| last.elapsed() >= self.interval)
    }

    fn invoke(&mut self, file_name: Option<&str>, amount: ProgressAmount) -> bool {
        if let Some(callback) = self.callback.as_mut() {
            callback.on_progress(file_name, amount)
        } else if let Some(callback) = DEFAULT_CALLBACK.get() {
            callback(file_name, amount)
        } else {
            true
        }
    }

    /// Reports accumulated bytes if the throttle interval has elapsed.
    pub fn tick(&mut self) -> Result<()> {
        if !self.due() {
            return Ok(());
        }
        let amount = ProgressAmount::Bytes(self.pending_bytes);
        self.pending_bytes = 0;
        self.last_tick = Some(Instant::now());
        if self.invoke(None, amount) {
            Ok(())
        } else {
            Err(Error::Cancelled)
        }
    }

    /// Reports an explicit amount if the throttle interval has elapsed.
    pub fn tick_with(&mut self, file_name: Option<&str>, amount: ProgressAmount) -> Result<()> {
        if !self.due() {
            return Ok(());
        }
        self.report(file_name, amount)
    }

    /// Reports an explicit amount immediately, ignoring the throttle.
    pub fn report(&mut self, file_name: Option<&str>, amount: ProgressAmount) -> Result<()> {
        self.last_tick = Some(Instant::now());
        if self.invoke(file_name, amount) {
            Ok(())
        } else {
            Err(Error::Cancelled)
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(None, DEFAULT_PROGRESS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_encoding() {
        assert_eq!(ProgressAmount::Bytes(1234).to_host(), 1234);
        assert_eq!(ProgressAmount::Bytes(u64::MAX).to_host(), i32::MAX);
        assert_eq!(ProgressAmount::Percent(42).to_host(), -42);
        assert_eq!(ProgressAmount::Percent(0).to_host(), 0);
        assert_eq!(ProgressAmount::from_host(-42), ProgressAmount::Percent(42));
        assert_eq!(ProgressAmount::from_host(7), ProgressAmount::Bytes(7));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 10), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(10, 10), 100);
        assert_eq!(percent(20, 10), 100);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn test_first_tick_fires() {
        let sink = AtomicProgress::shared();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::from_secs(60));
        progress.add_bytes(100);
        progress.tick().unwrap();
        assert_eq!(sink.notifications(), 1);
        assert_eq!(sink.bytes(), 100);
        assert_eq!(progress.pending_bytes(), 0);
    }

    #[test]
    fn test_throttled() {
        let sink = AtomicProgress::shared();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::from_secs(60));
        progress.tick().unwrap();
        progress.add_bytes(5);
        progress.tick().unwrap();
        progress
            .tick_with(Some("a.txt"), ProgressAmount::Percent(50))
            .unwrap();
        assert_eq!(sink.notifications(), 1);
        assert_eq!(progress.pending_bytes(), 5);
    }

    #[test]
    fn test_report_ignores_throttle() {
        let sink = AtomicProgress::shared();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::from_secs(60));
        progress.tick().unwrap();
        progress
            .report(Some("archive.smpa"), ProgressAmount::Bytes(0))
            .unwrap();
        assert_eq!(sink.notifications(), 2);
    }

    #[test]
    fn test_zero_interval_always_fires() {
        let sink = AtomicProgress::shared();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::ZERO);
        for _ in 0..5 {
            progress.tick().unwrap();
        }
        assert_eq!(sink.notifications(), 5);
    }

    #[test]
    fn test_cancel() {
        let sink = AtomicProgress::shared();
        let mut progress = Progress::new(Some(Box::new(Arc::clone(&sink))), Duration::ZERO);
        progress.tick().unwrap();
        sink.cancel();
        assert!(matches!(progress.tick(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_closure_callback() {
        let mut seen = Vec::new();
        {
            let mut callback = |name: Option<&str>, amount: ProgressAmount| {
                seen.push((name.map(str::to_string), amount));
                amount != ProgressAmount::Percent(100)
            };
            assert!(callback.on_progress(Some("x"), ProgressAmount::Percent(10)));
            assert!(!callback.on_progress(None, ProgressAmount::Percent(100)));
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0.as_deref(), Some("x"));
    }

    #[test]
    fn test_no_progress() {
        let mut p = NoProgress;
        assert!(p.on_progress(None, ProgressAmount::Bytes(1)));
    }
}
