//! Turns raw filesystem metadata into [`EntryRecord`]s.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use compact_str::CompactString;

use filetally_core::EntryRecord;

/// Build the normalized record for `path` from metadata obtained without
/// following symlinks. `root` is the scan root the depth is measured from.
pub fn classify(path: &Path, metadata: &Metadata, root: &Path) -> EntryRecord {
    let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
    let depth = depth_below(path, root);

    if metadata.is_dir() {
        EntryRecord::directory(path, modified, depth)
    } else {
        EntryRecord::file(path, metadata.len(), modified, extension_of(path), depth)
    }
}

/// Lowercase extension of the final path component, leading dot included.
///
/// Only the last dot counts, and a name that starts with its only dot
/// (`.bashrc`) has no extension.
pub fn extension_of(path: &Path) -> CompactString {
    let Some(name) = path.file_name() else {
        return CompactString::default();
    };
    let name = name.to_string_lossy();

    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase().into(),
        _ => CompactString::default(),
    }
}

/// Number of components between `root` and `path`; 0 for the root itself.
pub fn depth_below(path: &Path, root: &Path) -> u32 {
    let components = match path.strip_prefix(root) {
        Ok(relative) => relative.components().count(),
        Err(_) => path.components().count(),
    };
    components as u32
}
