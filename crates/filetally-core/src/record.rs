//! Normalized per-entry records.

use std::path::PathBuf;
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Key used in extension tables for files without an extension.
pub const NO_EXTENSION: &str = "[no extension]";

/// A single classified file or directory.
///
/// Produced once per visited entry and handed to the aggregator by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Full path of the entry.
    pub path: PathBuf,

    /// Size in bytes as reported by the filesystem.
    pub size: u64,

    /// Last modification time.
    pub modified: SystemTime,

    /// Whether the entry is a directory.
    pub is_dir: bool,

    /// Lowercase extension including the leading dot, empty if none.
    pub extension: CompactString,

    /// Number of path components between the scan root and this entry.
    pub depth: u32,
}

impl EntryRecord {
    /// Create a file record.
    pub fn file(
        path: impl Into<PathBuf>,
        size: u64,
        modified: SystemTime,
        extension: impl Into<CompactString>,
        depth: u32,
    ) -> Self {
        Self {
            path: path.into(),
            size,
            modified,
            is_dir: false,
            extension: extension.into(),
            depth,
        }
    }

    /// Create a directory record.
    pub fn directory(path: impl Into<PathBuf>, modified: SystemTime, depth: u32) -> Self {
        Self {
            path: path.into(),
            size: 0,
            modified,
            is_dir: true,
            extension: CompactString::default(),
            depth,
        }
    }

    /// Extension table key for this record.
    pub fn extension_key(&self) -> CompactString {
        if self.extension.is_empty() {
            CompactString::const_new(NO_EXTENSION)
        } else {
            self.extension.to_lowercase().into()
        }
    }
}
