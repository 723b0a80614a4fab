//! Scan progress reporting.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select, tick};
use tokio::sync::broadcast;
use tracing::trace;

use crate::cancel::CancelSignal;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files processed so far.
    pub files_scanned: u64,
    /// Number of directories processed so far.
    pub dirs_scanned: u64,
    /// Total bytes of processed files.
    pub bytes_scanned: u64,
    /// Most recently enumerated path.
    pub current_path: PathBuf,
    /// Number of errors encountered.
    pub errors_count: u64,
    /// Entries under system pseudo-filesystem prefixes.
    pub skipped_count: u64,
    /// Text of the most recent error, empty if none.
    pub last_error: String,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
    /// Set on the final snapshot published for a scan.
    pub done: bool,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            skipped_count: 0,
            last_error: String::new(),
            elapsed: Duration::ZERO,
            done: false,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate scan rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total items scanned (files + dirs).
    pub fn total_items(&self) -> u64 {
        self.files_scanned + self.dirs_scanned
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct TelemetryText {
    started: Instant,
    current_path: PathBuf,
    last_error: String,
}

/// Live counters for progress display.
///
/// Written by the walker and every worker, read by the sampler. The counters
/// are independent of the aggregator and only eventually consistent with it.
/// The text fields sit behind their own lock so they never contend with the
/// aggregator's.
#[derive(Debug)]
pub(crate) struct LiveTelemetry {
    files_seen: AtomicU64,
    dirs_seen: AtomicU64,
    bytes_seen: AtomicU64,
    errors_seen: AtomicU64,
    skipped_seen: AtomicU64,
    text: Mutex<TelemetryText>,
}

impl LiveTelemetry {
    pub fn new() -> Self {
        Self {
            files_seen: AtomicU64::new(0),
            dirs_seen: AtomicU64::new(0),
            bytes_seen: AtomicU64::new(0),
            errors_seen: AtomicU64::new(0),
            skipped_seen: AtomicU64::new(0),
            text: Mutex::new(TelemetryText {
                started: Instant::now(),
                current_path: PathBuf::new(),
                last_error: String::new(),
            }),
        }
    }

    pub fn reset(&self) {
        self.files_seen.store(0, Ordering::Relaxed);
        self.dirs_seen.store(0, Ordering::Relaxed);
        self.bytes_seen.store(0, Ordering::Relaxed);
        self.errors_seen.store(0, Ordering::Relaxed);
        self.skipped_seen.store(0, Ordering::Relaxed);

        let mut text = self.text();
        text.started = Instant::now();
        text.current_path.clear();
        text.last_error.clear();
    }

    pub fn record_file(&self, size: u64) {
        self.files_seen.fetch_add(1, Ordering::Relaxed);
        self.bytes_seen.fetch_add(size, Ordering::Relaxed);
    }

    pub fn record_dir(&self) {
        self.dirs_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, message: String) {
        self.errors_seen.fetch_add(1, Ordering::Relaxed);
        self.text().last_error = message;
    }

    pub fn set_current_path(&self, path: &Path) {
        let mut text = self.text();
        text.current_path.clear();
        text.current_path.push(path);
    }

    pub fn skipped(&self) -> u64 {
        self.skipped_seen.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, done: bool) -> ScanProgress {
        let (current_path, last_error, elapsed) = {
            let text = self.text();
            (
                text.current_path.clone(),
                text.last_error.clone(),
                text.started.elapsed(),
            )
        };

        ScanProgress {
            files_scanned: self.files_seen.load(Ordering::Relaxed),
            dirs_scanned: self.dirs_seen.load(Ordering::Relaxed),
            bytes_scanned: self.bytes_seen.load(Ordering::Relaxed),
            current_path,
            errors_count: self.errors_seen.load(Ordering::Relaxed),
            skipped_count: self.skipped_seen.load(Ordering::Relaxed),
            last_error,
            elapsed,
            done,
        }
    }

    fn text(&self) -> std::sync::MutexGuard<'_, TelemetryText> {
        match self.text.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Publish a snapshot every `interval` until cancellation or until
/// `finished` disconnects, then publish a final snapshot marked `done`.
///
/// Only reads scan state. Sends are best-effort: having no subscribers is
/// not an error.
pub(crate) fn run_sampler(
    telemetry: &LiveTelemetry,
    interval: Duration,
    cancel: &CancelSignal,
    finished: &Receiver<()>,
    progress_tx: &broadcast::Sender<ScanProgress>,
) {
    let ticker = tick(interval);

    loop {
        select! {
            recv(ticker) -> _ => {
                let progress = telemetry.snapshot(false);
                trace!(
                    files = progress.files_scanned,
                    dirs = progress.dirs_scanned,
                    errors = progress.errors_count,
                    "progress sample"
                );
                let _ = progress_tx.send(progress);
            }
            recv(cancel.closed()) -> _ => break,
            recv(finished) -> _ => break,
        }
    }

    let _ = progress_tx.send(telemetry.snapshot(true));
}
