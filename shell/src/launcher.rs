//! Starting external commands.
//!
//! The child replaces its image with `argv[0]` through `execv`, so no `PATH`
//! search happens: the first token must name an executable file directly.

use crate::error::{Result, ShellError};
use crate::tokenizer::ArgVector;
use nix::libc;
use nix::unistd::{ForkResult, Pid, execv, fork, write};
use std::ffi::{CStr, CString};
use tracing::debug;

/// Fork a child that executes `argv`, returning its pid.
///
/// The parent does not wait; reaping is up to [`crate::reaper`]. When the
/// image cannot be replaced the child reports the cause on stderr and exits
/// with `exec_failure_status`.
pub fn launch(argv: &ArgVector<'_>, exec_failure_status: i32) -> Result<Pid> {
    // Everything the child needs is allocated before the fork.
    let args = argv
        .as_slice()
        .iter()
        .map(|arg| CString::new(*arg).map_err(|_| ShellError::InvalidArgument(arg.to_string())))
        .collect::<Result<Vec<_>>>()?;
    let path = args.first().ok_or(ShellError::EmptyCommand)?;

    // SAFETY: between fork and exec the child only calls execv, write and
    // _exit, which are all async-signal-safe.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!(pid = %child, program = ?path, "spawned child");
            Ok(child)
        }
        Ok(ForkResult::Child) => replace_image(path, &args, exec_failure_status),
        Err(errno) => Err(ShellError::Spawn(errno)),
    }
}

fn replace_image(path: &CStr, args: &[CString], failure_status: i32) -> ! {
    let errno = match execv(path, args) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    let stderr = std::io::stderr();
    for part in [&b"error: child: "[..], errno.desc().as_bytes(), &b"\n"[..]] {
        // Nowhere left to report a failed write.
        let _ = write(&stderr, part);
    }
    // SAFETY: _exit skips atexit handlers and stdio flushing, which belong
    // to the parent.
    unsafe { libc::_exit(failure_status) }
}
