//! filetally - Concurrent directory scanner with live progress.
//!
//! Usage:
//!   filetally [PATH]             Scan PATH and print a summary report
//!   filetally [PATH] --json      Print the result as JSON
//!   filetally --help             Show help

mod report;

use std::path::PathBuf;
use std::thread;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use filetally_core::{DEFAULT_QUEUE_CAPACITY, DEFAULT_TOP_N};
use filetally_scan::{ScanConfig, Scanner};

#[derive(Parser)]
#[command(
    name = "filetally",
    version,
    about = "Concurrent directory scanner with live progress",
    long_about = "filetally walks a directory tree with a pool of workers and reports \
                  totals, file extremes, the busiest extensions and directories, and \
                  the depth distribution.\n\nPress Ctrl-C to stop early and print \
                  partial results."
)]
struct Cli {
    /// Path to scan (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Number of entries in the extension and directory rankings
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Number of worker threads (0 = twice the number of cores)
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// Capacity of the queue between the walker and the workers
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue: usize,

    /// Print the result as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Do not render the live progress line
    #[arg(long)]
    no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = ScanConfig::builder()
        .root(&cli.path)
        .workers(cli.workers)
        .queue_capacity(cli.queue)
        .top_n(cli.top)
        .build()
        .context("Invalid scan configuration")?;

    let scanner = Scanner::new(config);

    let stop = scanner.stop_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping scan...");
        stop.stop();
    })
    .context("Failed to set signal handler")?;

    let renderer = if cli.no_progress {
        None
    } else {
        let progress_rx = scanner.subscribe();
        Some(thread::spawn(move || report::render_progress(progress_rx)))
    };

    let result = scanner.scan();

    if let Some(renderer) = renderer {
        let _ = renderer.join();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        report::print_report(&result, scanner.config().top_n);
    }

    Ok(())
}

fn setup_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
