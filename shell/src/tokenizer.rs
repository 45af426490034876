//! Splitting a line into a bounded argument vector.

use crate::error::{Result, ShellError};

/// Separates tokens. Runs of it count as one separator.
pub const DELIMITER: char = ' ';

/// Tokens of one line, borrowed from the line buffer.
///
/// No element is empty and there are always fewer elements than the limit
/// the vector was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgVector<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> ArgVector<'a> {
    /// The command name, `argv[0]`.
    pub fn program(&self) -> Option<&'a str> {
        self.tokens.first().copied()
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[&'a str] {
        self.tokens.get(1..).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split `line` on [`DELIMITER`] into at most `max_tokens - 1` tokens.
///
/// Reaching `max_tokens` tokens fails the whole line; no partial vector is
/// returned.
pub fn tokenize(line: &str, max_tokens: usize) -> Result<ArgVector<'_>> {
    let mut tokens = Vec::new();
    for token in line.split(DELIMITER).filter(|token| !token.is_empty()) {
        tokens.push(token);
        if tokens.len() >= max_tokens {
            return Err(ShellError::TooManyTokens { limit: max_tokens });
        }
    }
    Ok(ArgVector { tokens })
}
