use crate::buffer::{HeapAllocator, LineBuffer, RegionAllocator};
use crate::command::ExitCode;
use crate::signals::Interrupt;
use tracing::debug;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    EndOfInput,
    /// The `exit` builtin ran.
    Exit(ExitCode),
    /// `SIGINT` was observed at a suspension point.
    Interrupted,
    /// Standard input failed; the error was already reported.
    ReadError,
    /// A fatal error is about to be returned to the caller.
    Fatal,
}

impl Release {
    /// Process exit status matching the reason.
    pub fn status(self) -> ExitCode {
        match self {
            Release::Exit(code) => code,
            Release::Fatal => 1,
            Release::EndOfInput | Release::Interrupted | Release::ReadError => 0,
        }
    }
}

/// Everything one interactive session owns.
///
/// The execution loop holds the only `Session`; the release path takes it by
/// value, so its resources are freed exactly once.
pub struct Session<A: RegionAllocator = HeapAllocator> {
    pub(crate) buffer: LineBuffer<A>,
    pub(crate) interrupt: Interrupt,
}

impl<A: RegionAllocator> Session<A> {
    pub fn new(buffer: LineBuffer<A>, interrupt: Interrupt) -> Self {
        Self { buffer, interrupt }
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn buffer(&self) -> &LineBuffer<A> {
        &self.buffer
    }

    /// Free the line buffer and return the exit status for `reason`.
    pub fn release(self, reason: Release) -> ExitCode {
        debug!(
            ?reason,
            capacity = self.buffer.capacity(),
            "releasing session"
        );
        drop(self.buffer);
        reason.status()
    }
}
