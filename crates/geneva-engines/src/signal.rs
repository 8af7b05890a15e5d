//! A process-wide `SIGHUP` flag the driver checks between iterations (§6
//! "Signals"). Grounded on `signal-hook`'s synchronous `flag::register` API
//! — the crate other examples in the pack reach for when a process needs to
//! react to a signal without an async runtime (the teacher has no signal
//! handling of its own to draw from).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheap handle onto the process-wide `SIGHUP` flag. Cloning shares the
/// same underlying `AtomicBool`.
#[derive(Clone)]
pub struct SignalFlag {
    flag: Arc<AtomicBool>,
}

impl SignalFlag {
    /// Registers (once per process) a `SIGHUP` handler that sets an
    /// `AtomicBool`, and returns a handle to it. Registration failure (an
    /// already-trapped signal, or an unsupported platform) downgrades to a
    /// flag that is simply never set — a driver built without signal support
    /// still halts correctly via its other halt conditions.
    pub fn global() -> Self {
        static FLAG: std::sync::OnceLock<Arc<AtomicBool>> = std::sync::OnceLock::new();
        let flag = FLAG
            .get_or_init(|| {
                let flag = Arc::new(AtomicBool::new(false));
                if let Err(err) = signal_hook::flag::register(signal_hook::consts::SIGHUP, Arc::clone(&flag)) {
                    tracing::warn!(%err, "failed to register SIGHUP handler, signal-triggered halt disabled");
                }
                flag
            })
            .clone();
        Self { flag }
    }

    /// For tests and embedders that want to simulate a signal without
    /// sending one.
    pub fn for_testing() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}
