use crate::error::{Result, ShellError};

/// Bytes added to the line buffer each time a read fills it.
pub const GROWTH_INCREMENT: usize = 4096;

/// Capacity of the argument vector, `_POSIX_ARG_MAX` on every POSIX system.
pub const MAX_TOKENS: usize = 4096;

/// Exit status of a child whose `execv` failed.
///
/// Lets the parent tell "could not start" apart from the program's own failure.
pub const EXEC_FAILURE_STATUS: i32 = 66;

pub const PROMPT: &str = "$";

/// Tunables of an interpreter session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Marker written to the diagnostic stream before every read.
    pub prompt: String,
    /// Growth step of the line buffer; capacity is always a multiple of it.
    pub growth_increment: usize,
    /// `N_max`: a line must tokenize to fewer tokens than this.
    pub max_tokens: usize,
    pub exec_failure_status: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            growth_increment: GROWTH_INCREMENT,
            max_tokens: MAX_TOKENS,
            exec_failure_status: EXEC_FAILURE_STATUS,
        }
    }
}

impl Config {
    /// Reject values the interpreter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.growth_increment == 0 {
            return Err(ShellError::InvalidConfig(
                "growth increment must be positive".to_string(),
            ));
        }
        if self.max_tokens < 2 {
            return Err(ShellError::InvalidConfig(format!(
                "max tokens must be at least 2, got {}",
                self.max_tokens
            )));
        }
        if !(1..=255).contains(&self.exec_failure_status) {
            return Err(ShellError::InvalidConfig(format!(
                "exec failure status must be in 1..=255, got {}",
                self.exec_failure_status
            )));
        }
        Ok(())
    }
}
