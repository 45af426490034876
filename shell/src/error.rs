use nix::errno::Errno;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while reading, parsing or running a line.
///
/// Only [`ShellError::OutOfMemory`] and [`ShellError::Write`] are fatal to the
/// interpreter. Every other variant aborts the current line and the loop moves
/// on to the next prompt.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The line buffer could not grow to hold the current line.
    #[error("cannot allocate {requested} bytes for the line buffer")]
    OutOfMemory { requested: usize },

    /// Writing a prompt or a diagnostic failed; nothing can be reported anymore.
    #[error("cannot write to the diagnostic stream: {0}")]
    Write(#[source] std::io::Error),

    /// Reading standard input failed.
    #[error("{0}")]
    Read(#[source] std::io::Error),

    /// A read was interrupted by a signal before a line was complete.
    #[error("interrupted")]
    Interrupted,

    #[error("input is not valid UTF-8")]
    NotUtf8,

    /// The line holds more tokens than the argument vector can carry.
    #[error("too many tokens")]
    TooManyTokens { limit: usize },

    /// A builtin was called with the wrong arguments.
    #[error("{detail}")]
    Usage {
        command: &'static str,
        detail: &'static str,
    },

    #[error("{}: {source}", .path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("empty command")]
    EmptyCommand,

    /// An argument cannot be passed to `execv`.
    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),

    /// `fork` failed; the command did not run.
    #[error("{}", .0.desc())]
    Spawn(Errno),

    /// `wait` failed with something other than `ECHILD`.
    #[error("{}", .0.desc())]
    Wait(Errno),

    #[error("cannot install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ShellError {
    /// Returns true when the interpreter cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::OutOfMemory { .. } | ShellError::Write(_))
    }
}

/// Print `err` as `error: <cause>` on the diagnostic stream.
pub fn report(diag: &mut dyn Write, err: &ShellError) -> Result<()> {
    writeln!(diag, "error: {err}").map_err(ShellError::Write)
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
