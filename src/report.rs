//! Human-readable rendering of live progress and the final report.

use std::io::Write;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tokio::sync::broadcast::{self, error::RecvError};

use filetally_core::{EntryRecord, NO_EXTENSION, ScanResult, file_category};
use filetally_scan::ScanProgress;

const PROGRESS_PATH_WIDTH: usize = 80;

/// Render progress snapshots on stderr until the final one arrives.
pub fn render_progress(mut rx: broadcast::Receiver<ScanProgress>) {
    let mut stderr = std::io::stderr().lock();

    loop {
        let progress = match rx.blocking_recv() {
            Ok(progress) => progress,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };

        // Clear the status block left by the previous sample.
        let _ = write!(stderr, "\r\x1b[K\n\x1b[K\n\x1b[K\x1b[2A\r");
        if progress.done {
            let _ = stderr.flush();
            break;
        }

        let _ = write!(
            stderr,
            "Scanned Files: {} | Dirs: {} | Errors: {} | Skipped: {} | Size: {} | Time: {}s",
            progress.files_scanned,
            progress.dirs_scanned,
            progress.errors_count,
            progress.skipped_count,
            format_size(progress.bytes_scanned),
            progress.elapsed.as_secs(),
        );

        let mut lines = 0;
        let current = progress.current_path.to_string_lossy();
        if !current.is_empty() {
            let _ = write!(
                stderr,
                "\nCurrent: {}",
                truncate_left(&current, PROGRESS_PATH_WIDTH)
            );
            lines += 1;
        }
        if progress.errors_count > 0 && !progress.last_error.is_empty() {
            let _ = write!(
                stderr,
                "\nLast Error: {}",
                truncate_right(&progress.last_error, PROGRESS_PATH_WIDTH)
            );
            lines += 1;
        }
        if lines > 0 {
            let _ = write!(stderr, "\x1b[{lines}A\r");
        }
        let _ = stderr.flush();
    }
}

/// Print the final report on stdout.
pub fn print_report(result: &ScanResult, top_n: usize) {
    println!();
    println!("{:^70}", "FILE SYSTEM SCAN RESULTS");
    if result.cancelled {
        println!("{:^70}", "(scan interrupted, results are partial)");
    }
    println!();

    print_field("SCANNED PATH", result.root.display());
    print_field("TOTAL FILES", format!("{} files", result.total_files));
    print_field("TOTAL DIRECTORIES", format!("{} directories", result.total_dirs));
    print_field("TOTAL SIZE", format_size(result.total_size));
    print_field("SCAN DURATION", format_duration(result.scan_duration));
    print_field(
        "AVERAGE FILE SIZE",
        format_size(result.average_file_size as u64),
    );
    print_field(
        "PROCESSING SPEED",
        format!("{:.2} files/s", result.files_per_second),
    );
    if result.has_errors() {
        print_field("ERRORS", format!("{} errors", result.total_errors));
    } else {
        print_field("ERRORS", "none");
    }
    if result.total_skipped > 0 {
        print_field("SYSTEM PATHS", format!("{} entries", result.total_skipped));
    }
    println!();

    if result.total_files > 0 {
        print_extreme("LARGEST FILE", result.largest_file.as_ref(), size_detail);
        print_extreme("SMALLEST FILE", result.smallest_file.as_ref(), size_detail);
        print_extreme("OLDEST FILE", result.oldest_file.as_ref(), modified_detail);
        print_extreme("NEWEST FILE", result.newest_file.as_ref(), modified_detail);
        println!();
    }

    if !result.top_extensions.is_empty() {
        println!("TOP {top_n} EXTENSIONS BY COUNT");
        let rows = result
            .top_extensions
            .iter()
            .enumerate()
            .filter(|(_, ext)| ext.extension != NO_EXTENSION)
            .map(|(i, ext)| {
                vec![
                    (i + 1).to_string(),
                    ext.extension.to_string(),
                    file_category(&ext.extension).to_string(),
                    ext.count.to_string(),
                    format_size(ext.total_size),
                ]
            })
            .collect::<Vec<_>>();

        print_table(
            &[
                Column::new("#", 4),
                Column::new("EXTENSION", 11),
                Column::new("CATEGORY", 9),
                Column::new("COUNT", 7),
                Column::new("TOTAL SIZE", 11),
            ],
            &rows,
        );
        println!();
    }

    if !result.top_directories.is_empty() {
        println!("TOP {top_n} DIRECTORIES BY SIZE");
        let rows = result
            .top_directories
            .iter()
            .enumerate()
            .map(|(i, dir)| {
                vec![
                    (i + 1).to_string(),
                    truncate_left(&dir.path.to_string_lossy(), 60),
                    dir.file_count.to_string(),
                    dir.dir_count.to_string(),
                    format_size(dir.total_size),
                ]
            })
            .collect::<Vec<_>>();

        print_table(
            &[
                Column::new("#", 4),
                Column::new("DIRECTORY", 42),
                Column::new("FILES", 7),
                Column::new("DIRS", 7),
                Column::new("TOTAL SIZE", 11),
            ],
            &rows,
        );
    }
}

struct Column {
    title: &'static str,
    min_width: usize,
}

impl Column {
    fn new(title: &'static str, min_width: usize) -> Self {
        Self { title, min_width }
    }
}

fn print_table(columns: &[Column], rows: &[Vec<String>]) {
    let widths = column_widths(columns, rows);

    let header: Vec<&str> = columns.iter().map(|c| c.title).collect();
    println!("{}", format_row(&header, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", format_row(&rule, &widths));
    for row in rows {
        println!("{}", format_row(row, &widths));
    }
}

fn column_widths(columns: &[Column], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain([column.title.len(), column.min_width])
                .max()
                .unwrap_or(column.min_width)
        })
        .collect()
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{label:<20} {value}");
}

fn print_extreme(label: &str, record: Option<&EntryRecord>, detail: fn(&EntryRecord) -> String) {
    match record {
        Some(record) => print_field(
            label,
            format!("{} ({})", record.path.display(), detail(record)),
        ),
        None => print_field(label, "-"),
    }
}

fn size_detail(record: &EntryRecord) -> String {
    format_size(record.size)
}

fn modified_detail(record: &EntryRecord) -> String {
    format_time(record.modified)
}

/// Format size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn format_duration(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

/// Keep the tail of `s`, prefixing "..." when it had to be cut.
fn truncate_left(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let tail: String = s.chars().skip(len - keep).collect();
    format!("...{tail}")
}

/// Keep the head of `s`, suffixing "..." when it had to be cut.
fn truncate_right(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{head}...")
}
