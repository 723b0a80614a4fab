//! Cooperative cancellation shared by the walker, workers and sampler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, bounded};

/// One-shot, broadcast cancellation signal.
///
/// Running until [`stop`](Self::stop) is called, Stopping forever after.
/// The flag serves cheap polling between entries; the channel is never sent
/// on and disconnects when the signal fires, which wakes any thread blocked
/// in a `select!` on [`closed`](Self::closed).
#[derive(Debug)]
pub struct CancelSignal {
    flag: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    closed: Receiver<()>,
}

impl CancelSignal {
    /// Create a signal in the Running state.
    pub fn new() -> Self {
        let (trigger, closed) = bounded(0);
        Self {
            flag: AtomicBool::new(false),
            trigger: Mutex::new(Some(trigger)),
            closed,
        }
    }

    /// Fire the signal. Returns `true` only for the call that fired it.
    pub fn stop(&self) -> bool {
        if self.flag.swap(true, Ordering::SeqCst) {
            return false;
        }
        let mut trigger = match self.trigger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        trigger.take();
        true
    }

    /// Check whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Receiver that becomes ready (disconnected) once the signal fires.
    pub fn closed(&self) -> &Receiver<()> {
        &self.closed
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle for stopping a scan from another thread or a signal
/// handler.
#[derive(Debug, Clone)]
pub struct StopHandle {
    signal: Arc<CancelSignal>,
}

impl StopHandle {
    pub(crate) fn new(signal: Arc<CancelSignal>) -> Self {
        Self { signal }
    }

    /// Request cancellation. Idempotent.
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// Check whether cancellation was requested.
    pub fn is_stopped(&self) -> bool {
        self.signal.is_cancelled()
    }
}
