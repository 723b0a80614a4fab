//! Scan configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default capacity of the bounded path queue between walker and workers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default interval between live progress samples, in milliseconds.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 50;

/// Default length of the top-N extension and directory rankings.
pub const DEFAULT_TOP_N: usize = 5;

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Number of worker threads (0 = twice the available parallelism).
    #[builder(default = "0")]
    #[serde(default)]
    pub workers: usize,

    /// Capacity of the bounded path queue.
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Interval between progress samples, in milliseconds.
    #[builder(default = "DEFAULT_PROGRESS_INTERVAL_MS")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// Number of entries kept in the extension and directory rankings.
    #[builder(default = "DEFAULT_TOP_N")]
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_progress_interval() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if self.queue_capacity == Some(0) {
            return Err("Queue capacity must be at least 1".to_string());
        }
        if self.progress_interval_ms == Some(0) {
            return Err("Progress interval must be at least 1ms".to_string());
        }
        if self.top_n == Some(0) {
            return Err("Top-N must be at least 1".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            workers: 0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Resolve the worker count, applying the auto-detect rule for 0.
    pub fn worker_count(&self) -> usize {
        match self.workers {
            0 => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                cores * 2
            }
            n => n,
        }
    }

    /// Interval between progress samples.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
