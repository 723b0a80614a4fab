//! Aggregate statistics and the scan result snapshot.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::record::EntryRecord;

/// Depth below the scan root mapped to the number of files at that depth.
pub type DepthHistogram = BTreeMap<u32, u64>;

/// Per-extension counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionStat {
    /// Case-folded extension, or [`NO_EXTENSION`](crate::NO_EXTENSION).
    pub extension: CompactString,
    /// Number of files with this extension.
    pub count: u64,
    /// Sum of their sizes.
    pub total_size: u64,
    /// Derived at export time.
    pub average_size: f64,
    /// Share of all files, 0-100. Derived at export time.
    pub percentage: f64,
}

impl ExtensionStat {
    /// Create a new entry seeded with its first file.
    pub fn new(extension: impl Into<CompactString>, size: u64) -> Self {
        Self {
            extension: extension.into(),
            count: 1,
            total_size: size,
            average_size: 0.0,
            percentage: 0.0,
        }
    }

    /// Fold one more file into this entry.
    pub fn record(&mut self, size: u64) {
        self.count += 1;
        self.total_size += size;
    }

    /// Fill in the derived fields against the grand file total.
    pub fn finalize(&mut self, total_files: u64) {
        if self.count > 0 {
            self.average_size = self.total_size as f64 / self.count as f64;
        }
        if total_files > 0 {
            self.percentage = self.count as f64 / total_files as f64 * 100.0;
        }
    }
}

/// Shallow per-directory counters.
///
/// Files are keyed by their immediate parent and directories by their own
/// path, so nothing here is aggregated over descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryStat {
    /// Directory path.
    pub path: PathBuf,
    /// Files directly inside this directory.
    pub file_count: u64,
    /// Directory-visit increments keyed by this path.
    pub dir_count: u64,
    /// Sum of direct file sizes.
    pub total_size: u64,
    /// Derived at export time.
    pub average_size: f64,
}

impl DirectoryStat {
    /// Create an empty entry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_count: 0,
            dir_count: 0,
            total_size: 0,
            average_size: 0.0,
        }
    }

    /// Fill in the derived average.
    pub fn finalize(&mut self) {
        if self.file_count > 0 {
            self.average_size = self.total_size as f64 / self.file_count as f64;
        }
    }
}

/// Immutable snapshot of a completed or cancelled scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path that was scanned.
    pub root: PathBuf,
    /// Total number of files folded.
    pub total_files: u64,
    /// Total number of directories folded, root included.
    pub total_dirs: u64,
    /// Total size of all files in bytes.
    pub total_size: u64,
    /// Enumeration and metadata failures.
    pub total_errors: u64,
    /// Entries that lie under a system pseudo-filesystem prefix.
    pub total_skipped: u64,
    /// Time since the aggregator was created or reset.
    pub scan_duration: Duration,

    /// Largest file seen.
    pub largest_file: Option<EntryRecord>,
    /// Smallest non-empty file seen.
    pub smallest_file: Option<EntryRecord>,
    /// File with the earliest modification time.
    pub oldest_file: Option<EntryRecord>,
    /// File with the latest modification time.
    pub newest_file: Option<EntryRecord>,

    /// Mean file size in bytes.
    pub average_file_size: f64,
    /// Files folded per second of scan time.
    pub files_per_second: f64,
    /// Bytes folded per second of scan time.
    pub bytes_per_second: f64,

    /// Most common extensions, by count descending.
    pub top_extensions: Vec<ExtensionStat>,
    /// Heaviest directories, by direct file size descending.
    pub top_directories: Vec<DirectoryStat>,
    /// Files per depth below the root.
    pub depth_histogram: DepthHistogram,

    /// Whether the scan was stopped before enumeration finished.
    pub cancelled: bool,
}

impl ScanResult {
    /// An empty result for `root`, as returned when nothing was folded.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            total_files: 0,
            total_dirs: 0,
            total_size: 0,
            total_errors: 0,
            total_skipped: 0,
            scan_duration: Duration::ZERO,
            largest_file: None,
            smallest_file: None,
            oldest_file: None,
            newest_file: None,
            average_file_size: 0.0,
            files_per_second: 0.0,
            bytes_per_second: 0.0,
            top_extensions: Vec::new(),
            top_directories: Vec::new(),
            depth_histogram: DepthHistogram::new(),
            cancelled: false,
        }
    }

    /// Total items folded (files + directories).
    pub fn total_entries(&self) -> u64 {
        self.total_files + self.total_dirs
    }

    /// Check if any failures were counted.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Deepest level that holds at least one file.
    pub fn max_depth(&self) -> Option<u32> {
        self.depth_histogram.keys().next_back().copied()
    }
}
