//! Worker logic for the per-entry processing pool.
//!
//! Each worker:
//! - Pulls one path at a time from the shared bounded queue
//! - Reads metadata without following symlinks
//! - Classifies the entry and folds it into the aggregator
//! - Updates the live progress counters

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, select};

use filetally_core::ScanError;

use crate::classify::classify;
use crate::scanner::ScanShared;

/// Pseudo-filesystem prefixes counted as "skipped" in live progress.
const SYSTEM_PREFIXES: [&str; 8] = [
    "/proc", "/sys", "/dev", "/run", "/tmp", "/var/run", "/var/lock", "/var/tmp",
];

/// Check whether a path lies under a system pseudo-filesystem prefix.
pub fn is_system_path(path: &Path) -> bool {
    SYSTEM_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Statistics collected by one worker.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WorkerStats {
    pub id: usize,
    pub files: u64,
    pub dirs: u64,
    pub bytes: u64,
    pub errors: u64,
    pub skipped: u64,
}

/// Process paths from `source` until it is closed and drained or the scan
/// is cancelled.
pub(crate) fn drain(
    id: usize,
    source: &Receiver<PathBuf>,
    root: &Path,
    shared: &ScanShared,
) -> WorkerStats {
    let mut stats = WorkerStats {
        id,
        ..WorkerStats::default()
    };

    loop {
        if shared.cancel.is_cancelled() {
            break;
        }

        let path = select! {
            recv(source) -> msg => match msg {
                Ok(path) => path,
                Err(_) => break,
            },
            recv(shared.cancel.closed()) -> _ => break,
        };

        process_path(&path, root, shared, &mut stats);
    }

    stats
}

/// Stat, classify and fold a single path. Failures are counted and skipped.
pub(crate) fn process_path(path: &Path, root: &Path, shared: &ScanShared, stats: &mut WorkerStats) {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => {
            stats.errors += 1;
            shared.report_error(ScanError::io(path, err));
            return;
        }
    };

    let record = classify(path, &metadata, root);

    if record.is_dir {
        shared.aggregator.analyze_directory(record);
        shared.telemetry.record_dir();
        stats.dirs += 1;
    } else {
        let size = record.size;
        shared.aggregator.analyze_file(record);
        shared.telemetry.record_file(size);
        stats.files += 1;
        stats.bytes += size;
    }

    if is_system_path(path) {
        shared.telemetry.record_skip();
        stats.skipped += 1;
    }
}
