/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// What the execution loop does once a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Reap children and prompt for the next line.
    Continue,
    /// Release the session and terminate with this status.
    Exit(ExitCode),
}
