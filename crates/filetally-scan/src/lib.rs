//! Concurrent directory scanning engine for filetally.
//!
//! # Overview
//!
//! `filetally-scan` walks a directory tree and folds every entry into
//! running statistics while the scan is in flight:
//!
//! - **Single producer**: a depth-first walker pushes paths onto a bounded
//!   queue, pruning dependency, build and cache directories
//! - **Worker pool**: `2 × available parallelism` workers stat and classify
//!   each path
//! - **Aggregator**: one readers-writer lock over totals, extremes,
//!   per-extension and per-directory tables and a depth histogram
//! - **Progress**: live counters sampled on a fixed interval and published
//!   over a broadcast channel
//! - **Cancellation**: cooperative, idempotent, and a stopped scan still
//!   returns a well-formed partial result
//!
//! # Example
//!
//! ```rust,no_run
//! use filetally_scan::{ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(ScanConfig::new("/path/to/scan"));
//! let result = scanner.scan();
//!
//! println!("Total files: {}", result.total_files);
//! println!("Total size: {} bytes", result.total_size);
//! ```
//!
//! # Progress and cancellation
//!
//! ```rust,no_run
//! use filetally_scan::{ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(ScanConfig::new("/path/to/scan"));
//! let mut progress_rx = scanner.subscribe();
//! let stop = scanner.stop_handle();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         if progress.files_scanned > 1_000_000 {
//!             stop.stop();
//!         }
//!         if progress.done {
//!             break;
//!         }
//!     }
//! });
//!
//! let partial = scanner.scan();
//! println!("Stopped early: {}", partial.cancelled);
//! ```

mod aggregator;
mod cancel;
mod classify;
mod progress;
mod scanner;
mod walker;
mod worker;

pub use aggregator::Aggregator;
pub use cancel::{CancelSignal, StopHandle};
pub use classify::{classify, depth_below, extension_of};
pub use progress::ScanProgress;
pub use scanner::Scanner;
pub use walker::is_denied;
pub use worker::is_system_path;

// Re-export core types for convenience
pub use filetally_core::{
    DepthHistogram, DirectoryStat, EntryRecord, ExtensionStat, NO_EXTENSION, ScanConfig,
    ScanError, ScanResult,
};
