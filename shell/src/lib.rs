//! A minimal interactive command interpreter.
//!
//! Each line read from standard input either names a builtin (`cd`, `exit`),
//! which runs in-process, or an executable path, which runs in a forked child.
//! The interpreter waits for every child before reading the next line.
//!
//! The building blocks are public so they can be driven and tested on their
//! own: [`buffer`] acquires lines of any length, [`tokenizer`] turns them into
//! argument vectors, [`launcher`] and [`reaper`] manage child processes, and
//! [`Interpreter`] ties them into the prompt loop.

pub mod buffer;
mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod interpreter;
pub mod launcher;
pub mod logging;
pub mod reaper;
pub mod session;
pub mod signals;
pub mod tokenizer;

#[cfg(test)]
mod test_support;

pub use builtin::Builtin;
pub use config::Config;
pub use error::ShellError;
pub use interpreter::Interpreter;
pub use signals::Interrupt;
