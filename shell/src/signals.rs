//! Interactive interrupt (`SIGINT`) handling.
//!
//! The handler itself only touches atomics. While the loop is blocked reading
//! a line it terminates the process with `_exit(0)`; everywhere else it sets
//! a flag the loop checks at its next suspension point.

use crate::error::{Result, ShellError};
use signal_hook::consts::SIGINT;
use signal_hook::flag;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation state shared between the signal handler and the loop.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
    reading: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `SIGINT` actions for this process.
    pub fn install(&self) -> Result<()> {
        flag::register(SIGINT, Arc::clone(&self.requested)).map_err(ShellError::Signal)?;
        flag::register_conditional_shutdown(SIGINT, 0, Arc::clone(&self.reading))
            .map_err(ShellError::Signal)?;
        Ok(())
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Request cancellation as if the signal had arrived.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Mark the loop as blocked on input until the guard is dropped.
    pub(crate) fn reading(&self) -> ReadingGuard {
        self.reading.store(true, Ordering::SeqCst);
        ReadingGuard(Arc::clone(&self.reading))
    }

    /// True while the loop is blocked reading a line.
    pub fn is_reading(&self) -> bool {
        self.reading.load(Ordering::SeqCst)
    }
}

pub(crate) struct ReadingGuard(Arc<AtomicBool>);

impl Drop for ReadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
