//! Scan orchestration: walker, worker pool, sampler and aggregator wired
//! into one blocking call.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Receiver, bounded};
use rayon::{BroadcastContext, ThreadPoolBuilder};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use filetally_core::{ExtensionStat, ScanConfig, ScanError, ScanResult};

use crate::aggregator::Aggregator;
use crate::cancel::{CancelSignal, StopHandle};
use crate::progress::{self, LiveTelemetry, ScanProgress};
use crate::walker::{self, WalkSummary};
use crate::worker::{self, WorkerStats};

/// State shared by every thread of a scan.
#[derive(Debug)]
pub(crate) struct ScanShared {
    pub aggregator: Aggregator,
    pub telemetry: LiveTelemetry,
    pub cancel: Arc<CancelSignal>,
}

impl ScanShared {
    pub fn new() -> Self {
        Self {
            aggregator: Aggregator::new(),
            telemetry: LiveTelemetry::new(),
            cancel: Arc::new(CancelSignal::new()),
        }
    }

    /// Absorb a non-fatal failure into the error tallies.
    pub fn report_error(&self, err: ScanError) {
        debug!(path = %err.path().display(), error = %err, "Entry skipped");
        self.aggregator.increment_error();
        self.telemetry.record_error(err.to_string());
    }
}

/// Concurrent directory scanner.
///
/// One producer thread enumerates the tree, a fixed pool of workers stats
/// and folds each entry, and a sampler publishes live progress. A scanner
/// can run any number of scans one after another until [`stop`](Self::stop)
/// is called; stopping is permanent.
pub struct Scanner {
    config: ScanConfig,
    shared: ScanShared,
    progress_tx: broadcast::Sender<ScanProgress>,
    running: Mutex<()>,
}

impl Scanner {
    /// Create a new scanner.
    pub fn new(config: ScanConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            shared: ScanShared::new(),
            progress_tx,
            running: Mutex::new(()),
        }
    }

    /// Configuration this scanner was built with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Handle that can stop this scanner from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.shared.cancel))
    }

    /// Request cancellation of the running scan. Non-blocking and idempotent.
    pub fn stop(&self) {
        if self.shared.cancel.stop() {
            info!("Scan cancellation requested");
        }
    }

    /// Check whether the scanner has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Scan the configured root.
    pub fn scan(&self) -> ScanResult {
        self.start(self.config.root.clone())
    }

    /// Scan `root` and block until every worker has finished.
    ///
    /// A stopped scan returns the statistics gathered up to the stop, with
    /// `cancelled` set. Concurrent calls on one scanner run one at a time.
    pub fn start(&self, root: impl AsRef<Path>) -> ScanResult {
        let root = root.as_ref().to_path_buf();
        let _running = match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let shared = &self.shared;
        shared.aggregator.reset();
        shared.telemetry.reset();

        if shared.cancel.is_cancelled() {
            debug!(root = %root.display(), "Scanner already stopped, not scanning");
            let _ = self.progress_tx.send(shared.telemetry.snapshot(true));
            return self.finish(root);
        }

        let workers = self.config.worker_count();
        info!(
            root = %root.display(),
            workers,
            queue = self.config.queue_capacity,
            "Starting scan"
        );

        let (path_tx, path_rx) = bounded::<PathBuf>(self.config.queue_capacity);
        let (finished_tx, finished_rx) = bounded::<()>(0);

        let summary = thread::scope(|s| {
            s.spawn(|| {
                progress::run_sampler(
                    &shared.telemetry,
                    self.config.progress_interval(),
                    &shared.cancel,
                    &finished_rx,
                    &self.progress_tx,
                )
            });
            let walker = s.spawn(|| walker::walk(&root, path_tx, shared));

            let worker_stats = self.run_workers(workers, &path_rx, &root);
            drop(path_rx);
            drop(finished_tx);

            for stats in &worker_stats {
                debug!(
                    worker = stats.id,
                    files = stats.files,
                    dirs = stats.dirs,
                    bytes = stats.bytes,
                    errors = stats.errors,
                    skipped = stats.skipped,
                    "Worker finished"
                );
            }

            walker.join().unwrap_or_else(|_| {
                warn!("Walker thread panicked");
                WalkSummary::default()
            })
        });

        debug!(
            pushed = summary.pushed,
            pruned = summary.pruned,
            errors = summary.errors,
            cancelled = summary.cancelled,
            "Walk finished"
        );

        let result = self.finish(root);
        info!(
            files = result.total_files,
            dirs = result.total_dirs,
            entries = result.total_entries(),
            bytes = result.total_size,
            errors = result.total_errors,
            cancelled = result.cancelled,
            ms = result.scan_duration.as_millis() as u64,
            "Scan complete"
        );
        result
    }

    /// The full extension table of the last scan, not truncated to top-N.
    pub fn extension_table(&self) -> Vec<ExtensionStat> {
        self.shared.aggregator.all_extensions()
    }

    fn run_workers(&self, count: usize, source: &Receiver<PathBuf>, root: &Path) -> Vec<WorkerStats> {
        let shared = &self.shared;
        let op = |ctx: BroadcastContext<'_>| worker::drain(ctx.index(), source, root, shared);

        let pool = ThreadPoolBuilder::new()
            .num_threads(count)
            .thread_name(|i| format!("filetally-worker-{i}"))
            .build();

        match pool {
            Ok(pool) => pool.broadcast(op),
            Err(err) => {
                warn!(error = %err, "Could not build worker pool, using the global pool");
                rayon::broadcast(op)
            }
        }
    }

    fn finish(&self, root: PathBuf) -> ScanResult {
        let mut result = self.shared.aggregator.get_results(self.config.top_n);
        result.root = root;
        result.total_skipped = self.shared.telemetry.skipped();
        result.cancelled = self.shared.cancel.is_cancelled();
        result
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}
