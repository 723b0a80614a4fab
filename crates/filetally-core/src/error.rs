//! Error types for scanning operations.
//!
//! Nothing in here aborts a scan. Every failure is absorbed by the engine,
//! counted, and its `Display` text kept as the "last error" for live
//! progress output.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Per-entry failures encountered while scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// Path not found (missing root, or an entry that vanished mid-walk).
    #[error("Path not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Generic I/O error while reading metadata.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory enumeration failed.
    #[error("Error accessing {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an enumeration error with path context.
    pub fn walk(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Walk {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Walk { path, .. } => path,
        }
    }
}
