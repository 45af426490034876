//! Collecting terminated children.

use crate::error::{Result, ShellError, report};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, wait};
use nix::unistd::Pid;
use std::io::Write;
use tracing::{debug, info};

/// How a reaped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    Exited(i32),
    /// The child exited with the reserved status: its `execv` failed.
    ///
    /// A program that exits with that status by itself looks the same.
    ExecFailed,
    Signaled(Signal),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub outcome: ChildOutcome,
}

/// Block until no children remain, returning every child collected.
///
/// `ECHILD` ends the loop normally, including when nothing was ever started.
/// Other `wait` failures are reported on `diag` and the loop keeps draining.
pub fn reap_all(exec_failure_status: i32, diag: &mut dyn Write) -> Result<Vec<Reaped>> {
    let mut reaped = Vec::new();
    loop {
        match wait() {
            Ok(status) => {
                if let Some(child) = classify(status, exec_failure_status) {
                    match child.outcome {
                        ChildOutcome::ExecFailed => {
                            info!(pid = %child.pid, "child could not execute its program")
                        }
                        outcome => debug!(pid = %child.pid, ?outcome, "reaped child"),
                    }
                    reaped.push(child);
                }
            }
            Err(Errno::ECHILD) => break,
            Err(errno) => report(diag, &ShellError::Wait(errno))?,
        }
    }
    Ok(reaped)
}

fn classify(status: WaitStatus, exec_failure_status: i32) -> Option<Reaped> {
    let pid = status.pid()?;
    let outcome = match status {
        WaitStatus::Exited(_, code) if code == exec_failure_status => ChildOutcome::ExecFailed,
        WaitStatus::Exited(_, code) => ChildOutcome::Exited(code),
        WaitStatus::Signaled(_, signal, _) => ChildOutcome::Signaled(signal),
        _ => ChildOutcome::Other,
    };
    Some(Reaped { pid, outcome })
}
