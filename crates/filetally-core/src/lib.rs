//! Core types for filetally.
//!
//! This crate provides the data model shared by the scanning engine and the
//! report layer: per-entry records, aggregate statistics, the scan result
//! snapshot, configuration, errors, and the extension category table.

pub mod category;
mod config;
mod error;
mod record;
mod stats;

pub use category::{Category, extension_category, file_category};
pub use config::{
    DEFAULT_PROGRESS_INTERVAL_MS, DEFAULT_QUEUE_CAPACITY, DEFAULT_TOP_N, ScanConfig,
    ScanConfigBuilder, ScanConfigBuilderError,
};
pub use error::ScanError;
pub use record::{EntryRecord, NO_EXTENSION};
pub use stats::{DepthHistogram, DirectoryStat, ExtensionStat, ScanResult};
