//! Thread-safe statistics aggregation.
//!
//! Workers fold [`EntryRecord`]s in through [`Aggregator::analyze_file`] and
//! [`Aggregator::analyze_directory`]. Every fold takes the write half of one
//! readers-writer lock, so each fold is atomic with respect to all others.
//! [`Aggregator::get_results`] takes the read half and sees a consistent
//! point-in-time view. All folds are counter increments, sums, and strict
//! max/min comparisons, so the final state does not depend on which worker
//! got which entry.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use compact_str::CompactString;
use indexmap::IndexMap;

use filetally_core::{DepthHistogram, DirectoryStat, EntryRecord, ExtensionStat, ScanResult};

#[derive(Debug)]
struct AggregatorState {
    started: Instant,

    total_files: u64,
    total_dirs: u64,
    total_size: u64,
    total_errors: u64,

    largest_file: Option<EntryRecord>,
    smallest_file: Option<EntryRecord>,
    oldest_file: Option<EntryRecord>,
    newest_file: Option<EntryRecord>,

    // Insertion-ordered so ties in the rankings keep first-arrival order.
    extensions: IndexMap<CompactString, ExtensionStat>,
    directories: IndexMap<PathBuf, DirectoryStat>,
    depths: DepthHistogram,
}

impl AggregatorState {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            total_files: 0,
            total_dirs: 0,
            total_size: 0,
            total_errors: 0,
            largest_file: None,
            smallest_file: None,
            oldest_file: None,
            newest_file: None,
            extensions: IndexMap::new(),
            directories: IndexMap::new(),
            depths: DepthHistogram::new(),
        }
    }

    fn update_extremes(&mut self, record: &EntryRecord) {
        if self
            .largest_file
            .as_ref()
            .is_none_or(|r| record.size > r.size)
        {
            self.largest_file = Some(record.clone());
        }

        // Zero-byte files never count as the smallest.
        if record.size > 0
            && self
                .smallest_file
                .as_ref()
                .is_none_or(|r| record.size < r.size)
        {
            self.smallest_file = Some(record.clone());
        }

        if self
            .oldest_file
            .as_ref()
            .is_none_or(|r| record.modified < r.modified)
        {
            self.oldest_file = Some(record.clone());
        }

        if self
            .newest_file
            .as_ref()
            .is_none_or(|r| record.modified > r.modified)
        {
            self.newest_file = Some(record.clone());
        }
    }

    fn sorted_extensions(&self) -> Vec<ExtensionStat> {
        let mut extensions: Vec<ExtensionStat> = self
            .extensions
            .values()
            .cloned()
            .map(|mut stat| {
                stat.finalize(self.total_files);
                stat
            })
            .collect();
        extensions.sort_by(|a, b| b.count.cmp(&a.count));
        extensions
    }

    fn top_directories(&self, n: usize) -> Vec<DirectoryStat> {
        let mut directories: Vec<DirectoryStat> = self
            .directories
            .values()
            .cloned()
            .map(|mut stat| {
                stat.finalize();
                stat
            })
            .collect();
        directories.sort_by(|a, b| b.total_size.cmp(&a.total_size));
        directories.truncate(n);
        directories
    }
}

/// Single owner of all running scan statistics.
#[derive(Debug)]
pub struct Aggregator {
    state: RwLock<AggregatorState>,
}

impl Aggregator {
    /// Create an empty aggregator. Its clock starts now.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AggregatorState::new()),
        }
    }

    /// Fold a file record.
    ///
    /// Directory records passed here only bump the directory total.
    pub fn analyze_file(&self, record: EntryRecord) {
        let mut state = self.write();

        if record.is_dir {
            state.total_dirs += 1;
            return;
        }

        state.total_files += 1;
        state.total_size += record.size;
        *state.depths.entry(record.depth).or_insert(0) += 1;

        state.update_extremes(&record);

        let size = record.size;
        state
            .extensions
            .entry(record.extension_key())
            .and_modify(|stat| stat.record(size))
            .or_insert_with_key(|ext| ExtensionStat::new(ext.clone(), size));

        let parent = record
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();
        let stat = state
            .directories
            .entry(parent)
            .or_insert_with_key(|path| DirectoryStat::new(path.clone()));
        stat.file_count += 1;
        stat.total_size += record.size;
    }

    /// Fold a directory record, keyed by the directory's own path.
    pub fn analyze_directory(&self, record: EntryRecord) {
        let mut state = self.write();

        state.total_dirs += 1;

        let stat = state
            .directories
            .entry(record.path)
            .or_insert_with_key(|path| DirectoryStat::new(path.clone()));
        stat.dir_count += 1;
    }

    /// Count one enumeration or metadata failure.
    pub fn increment_error(&self) {
        self.write().total_errors += 1;
    }

    /// Snapshot the current statistics with `top_n` rankings.
    ///
    /// `root`, `total_skipped` and `cancelled` are left at their defaults for
    /// the orchestrator to fill in.
    pub fn get_results(&self, top_n: usize) -> ScanResult {
        let state = self.read();

        let scan_duration = state.started.elapsed();
        let secs = scan_duration.as_secs_f64();

        let average_file_size = if state.total_files > 0 {
            state.total_size as f64 / state.total_files as f64
        } else {
            0.0
        };
        let (files_per_second, bytes_per_second) = if secs > 0.0 {
            (
                state.total_files as f64 / secs,
                state.total_size as f64 / secs,
            )
        } else {
            (0.0, 0.0)
        };

        let mut top_extensions = state.sorted_extensions();
        top_extensions.truncate(top_n);

        ScanResult {
            total_files: state.total_files,
            total_dirs: state.total_dirs,
            total_size: state.total_size,
            total_errors: state.total_errors,
            scan_duration,
            largest_file: state.largest_file.clone(),
            smallest_file: state.smallest_file.clone(),
            oldest_file: state.oldest_file.clone(),
            newest_file: state.newest_file.clone(),
            average_file_size,
            files_per_second,
            bytes_per_second,
            top_extensions,
            top_directories: state.top_directories(top_n),
            depth_histogram: state.depths.clone(),
            ..ScanResult::empty(PathBuf::new())
        }
    }

    /// The full extension table, finalized and sorted by count descending.
    pub fn all_extensions(&self) -> Vec<ExtensionStat> {
        self.read().sorted_extensions()
    }

    /// Clear all state and restart the clock.
    pub fn reset(&self) {
        *self.write() = AggregatorState::new();
    }

    fn read(&self) -> RwLockReadGuard<'_, AggregatorState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, AggregatorState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    fn file(path: &str, size: u64, age_secs: u64) -> EntryRecord {
        let ext = crate::classify::extension_of(Path::new(path));
        let depth = Path::new(path).components().count() as u32 - 2;
        EntryRecord::file(
            path,
            size,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - age_secs),
            ext,
            depth,
        )
    }

    #[test]
    fn test_spec_tree_totals() {
        let agg = Aggregator::new();
        agg.analyze_directory(EntryRecord::directory("/r", SystemTime::UNIX_EPOCH, 0));
        agg.analyze_file(file("/r/a.txt", 10, 30));
        agg.analyze_file(file("/r/b.go", 20, 20));
        agg.analyze_file(file("/r/c.go", 5, 10));

        let result = agg.get_results(5);
        assert_eq!(result.total_files, 3);
        assert_eq!(result.total_dirs, 1);
        assert_eq!(result.total_size, 35);
        assert_eq!(result.top_extensions.len(), 2);
        assert_eq!(result.top_extensions[0].extension, ".go");
        assert_eq!(result.top_extensions[0].count, 2);
        assert_eq!(result.top_extensions[0].total_size, 25);
        assert_eq!(result.top_extensions[0].average_size, 12.5);
        assert_eq!(result.top_extensions[1].extension, ".txt");
        assert_eq!(result.top_extensions[1].total_size, 10);
        assert_eq!(result.largest_file.unwrap().path, PathBuf::from("/r/b.go"));
        assert_eq!(result.smallest_file.unwrap().path, PathBuf::from("/r/c.go"));
        assert_eq!(result.oldest_file.unwrap().path, PathBuf::from("/r/a.txt"));
        assert_eq!(result.newest_file.unwrap().path, PathBuf::from("/r/c.go"));
        assert_eq!(result.depth_histogram.get(&1), Some(&3));
    }

    #[test]
    fn test_zero_byte_files_never_smallest() {
        let agg = Aggregator::new();
        agg.analyze_file(file("/r/empty1", 0, 1));
        agg.analyze_file(file("/r/empty2", 0, 2));

        let result = agg.get_results(5);
        assert!(result.smallest_file.is_none());
        let largest = result.largest_file.unwrap();
        assert_eq!(largest.size, 0);
        assert_eq!(largest.path, PathBuf::from("/r/empty1"));
    }

    #[test]
    fn test_empty_aggregator_has_no_extremes() {
        let result = Aggregator::new().get_results(5);
        assert_eq!(result.total_files, 0);
        assert!(result.largest_file.is_none());
        assert!(result.smallest_file.is_none());
        assert!(result.oldest_file.is_none());
        assert!(result.newest_file.is_none());
        assert!(result.top_extensions.is_empty());
        assert_eq!(result.average_file_size, 0.0);
    }

    #[test]
    fn test_top_n_truncation() {
        let agg = Aggregator::new();
        let exts = [".a", ".b", ".c", ".d", ".e", ".f", ".g", ".h"];
        for (i, ext) in exts.iter().enumerate() {
            for j in 0..=i {
                agg.analyze_file(file(&format!("/r/f{j}{ext}"), 1, 0));
            }
        }

        let result = agg.get_results(5);
        assert_eq!(result.top_extensions.len(), 5);
        let counts: Vec<u64> = result.top_extensions.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![8, 7, 6, 5, 4]);
        assert_eq!(agg.all_extensions().len(), 8);
    }

    #[test]
    fn test_extension_sums_match_totals() {
        let agg = Aggregator::new();
        agg.analyze_file(file("/r/a.RS", 3, 0));
        agg.analyze_file(file("/r/b.rs", 4, 0));
        agg.analyze_file(file("/r/README", 5, 0));

        let result = agg.get_results(1);
        let all = agg.all_extensions();
        assert_eq!(all.iter().map(|e| e.count).sum::<u64>(), result.total_files);
        assert_eq!(all.iter().map(|e| e.total_size).sum::<u64>(), result.total_size);
        assert!(all.iter().any(|e| e.extension == filetally_core::NO_EXTENSION));
        let pct: f64 = all.iter().map(|e| e.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_directory_stats_are_shallow() {
        let agg = Aggregator::new();
        agg.analyze_directory(EntryRecord::directory("/r", SystemTime::UNIX_EPOCH, 0));
        agg.analyze_directory(EntryRecord::directory("/r/sub", SystemTime::UNIX_EPOCH, 1));
        agg.analyze_file(file("/r/top.bin", 100, 0));
        agg.analyze_file(file("/r/sub/deep.bin", 7, 0));
        agg.analyze_file(file("/r/sub/deeper.bin", 3, 0));

        let result = agg.get_results(5);
        let root = result
            .top_directories
            .iter()
            .find(|d| d.path == Path::new("/r"))
            .unwrap();
        assert_eq!(root.file_count, 1);
        assert_eq!(root.dir_count, 1);
        assert_eq!(root.total_size, 100);

        let sub = &result.top_directories[1];
        assert_eq!(sub.path, PathBuf::from("/r/sub"));
        assert_eq!(sub.file_count, 2);
        assert_eq!(sub.dir_count, 1);
        assert_eq!(sub.average_size, 5.0);
    }

    #[test]
    fn test_fold_order_independence() {
        let records: Vec<EntryRecord> = (0..50u64)
            .map(|i| file(&format!("/r/d{}/f{i}.e{}", i % 4, i % 3), i * 7 % 13 + 1, i * 11 % 17))
            .collect();

        let forward = Aggregator::new();
        records.iter().cloned().for_each(|r| forward.analyze_file(r));
        let backward = Aggregator::new();
        records.iter().rev().cloned().for_each(|r| backward.analyze_file(r));

        let a = forward.get_results(100);
        let b = backward.get_results(100);
        assert_eq!(a.total_files, b.total_files);
        assert_eq!(a.total_size, b.total_size);
        assert_eq!(a.depth_histogram, b.depth_histogram);
        assert_eq!(
            a.largest_file.map(|r| r.size),
            b.largest_file.map(|r| r.size)
        );
        assert_eq!(
            a.smallest_file.map(|r| r.size),
            b.smallest_file.map(|r| r.size)
        );
        assert_eq!(
            a.oldest_file.map(|r| r.modified),
            b.oldest_file.map(|r| r.modified)
        );

        let mut ea = forward.all_extensions();
        let mut eb = backward.all_extensions();
        ea.sort_by(|x, y| x.extension.cmp(&y.extension));
        eb.sort_by(|x, y| x.extension.cmp(&y.extension));
        assert_eq!(ea, eb);
    }

    #[test]
    fn test_concurrent_folds() {
        let agg = Arc::new(Aggregator::new());
        std::thread::scope(|s| {
            for t in 0..8 {
                let agg = Arc::clone(&agg);
                s.spawn(move || {
                    for i in 0..250 {
                        agg.analyze_file(file(&format!("/r/t{t}/f{i}.dat"), 2, 0));
                    }
                    agg.increment_error();
                });
            }
        });

        let result = agg.get_results(5);
        assert_eq!(result.total_files, 2000);
        assert_eq!(result.total_size, 4000);
        assert_eq!(result.total_errors, 8);
        assert_eq!(result.top_directories.len(), 5);
    }

    #[test]
    fn test_reset_clears_everything() {
        let agg = Aggregator::new();
        agg.analyze_file(file("/r/a.txt", 10, 0));
        agg.increment_error();
        agg.reset();

        let result = agg.get_results(5);
        assert_eq!(result.total_files, 0);
        assert_eq!(result.total_errors, 0);
        assert!(result.largest_file.is_none());
        assert!(result.top_directories.is_empty());
        assert!(result.depth_histogram.is_empty());
    }
}
