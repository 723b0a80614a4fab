//! Single-threaded depth-first tree enumeration.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use crossbeam_channel::{Sender, select};
use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use filetally_core::ScanError;

use crate::scanner::ScanShared;

/// Directory names whose subtrees are never enumerated.
static DENYLIST: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        ".git",
        "node_modules",
        ".npm",
        "venv",
        ".venv",
        "env",
        ".env",
        "target",
        "build",
        "dist",
        ".next",
        ".nuxt",
        "coverage",
        ".coverage",
        ".vscode",
        ".idea",
        "__pycache__",
        ".pytest_cache",
        "site-packages",
        "vendor",
        ".vendor",
        "cache",
        ".cache",
    ])
});

/// Check whether a directory base name is on the denylist.
pub fn is_denied(name: &OsStr) -> bool {
    name.to_str().is_some_and(|name| DENYLIST.contains(name))
}

/// Outcome of one walk.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WalkSummary {
    /// Paths handed to the queue.
    pub pushed: u64,
    /// Directories cut off by the denylist.
    pub pruned: u64,
    /// Enumeration failures.
    pub errors: u64,
    /// Whether the walk stopped early on cancellation.
    pub cancelled: bool,
}

/// Enumerate `root` depth-first and push every visited path onto `sink`.
///
/// Blocks while the queue is full. Returns when enumeration finishes, when
/// cancellation is observed, or when every consumer is gone; `sink` is
/// dropped on return, which closes the queue.
pub(crate) fn walk(root: &Path, sink: Sender<PathBuf>, shared: &ScanShared) -> WalkSummary {
    let mut summary = WalkSummary::default();
    let cancel = &shared.cancel;

    let root_is_dir = match std::fs::symlink_metadata(root) {
        Ok(metadata) => metadata.is_dir(),
        Err(err) => {
            summary.errors += 1;
            shared.report_error(ScanError::io(root, err));
            return summary;
        }
    };

    if root_is_dir && root.file_name().is_some_and(is_denied) {
        debug!(root = %root.display(), "Scan root is on the denylist");
        summary.pruned += 1;
        return summary;
    }

    let pruned = Arc::new(AtomicU64::new(0));
    let walker = {
        let pruned = Arc::clone(&pruned);
        let cancel = Arc::clone(cancel);

        WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .sort(false)
            .process_read_dir(move |_depth, _path, _state, children| {
                if cancel.is_cancelled() {
                    children.clear();
                    return;
                }
                children.retain(|entry| match entry {
                    Ok(e) if e.file_type().is_dir() && is_denied(e.file_name()) => {
                        pruned.fetch_add(1, Ordering::Relaxed);
                        false
                    }
                    _ => true,
                });
            })
    };

    for entry in walker {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let path = match entry {
            Ok(mut entry) => {
                let path = entry.path();
                // jwalk yields an unreadable directory as an entry carrying
                // the read_dir failure; the directory itself is still folded.
                if let Some(err) = entry.read_children_error.take() {
                    summary.errors += 1;
                    shared.report_error(ScanError::walk(&path, err.to_string()));
                }
                path
            }
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                summary.errors += 1;
                shared.report_error(ScanError::walk(path, err.to_string()));
                continue;
            }
        };

        shared.telemetry.set_current_path(&path);

        select! {
            send(sink, path) -> sent => {
                if sent.is_err() {
                    break;
                }
                summary.pushed += 1;
            }
            recv(cancel.closed()) -> _ => {
                summary.cancelled = true;
                break;
            }
        }
    }

    summary.pruned += pruned.load(Ordering::Relaxed);
    summary
}
