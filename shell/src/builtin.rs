use crate::command::Flow;
use crate::error::{Result, ShellError};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in the interpreter's own process; no child is created.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Message shown when the arguments are rejected.
    fn usage() -> &'static str;

    /// Build the command from the arguments following its name.
    ///
    /// Arguments are taken verbatim: `--`, `--help` and leading dashes carry
    /// no special meaning.
    fn parse(args: &[&str]) -> Option<Self>;

    fn execute(self, diag: &mut dyn Write) -> Result<Flow>;
}

/// Parse and run `T`, turning rejected arguments into a usage error.
fn run<T: BuiltinCommand>(args: &[&str], diag: &mut dyn Write) -> Result<Flow> {
    let cmd = T::parse(args).ok_or(ShellError::Usage {
        command: T::name(),
        detail: T::usage(),
    })?;
    cmd.execute(diag)
}

/// The reserved command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
}

const REGISTRY: &[Builtin] = &[Builtin::Cd, Builtin::Exit];

impl Builtin {
    /// Find the builtin named exactly `name`.
    pub fn lookup(name: &str) -> Option<Builtin> {
        REGISTRY.iter().copied().find(|builtin| builtin.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => Cd::name(),
            Builtin::Exit => Exit::name(),
        }
    }

    /// Run the builtin with the arguments that follow its name.
    pub fn run(self, args: &[&str], diag: &mut dyn Write) -> Result<Flow> {
        debug!(builtin = self.name(), argc = args.len() + 1, "running builtin");
        match self {
            Builtin::Cd => run::<Cd>(args, diag),
            Builtin::Exit => run::<Exit>(args, diag),
        }
    }
}

/// Change the current working directory to the single argument.
pub(crate) struct Cd {
    target: PathBuf,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn usage() -> &'static str {
        "expecting one argument"
    }

    fn parse(args: &[&str]) -> Option<Self> {
        match args {
            [target] => Some(Cd {
                target: PathBuf::from(target),
            }),
            _ => None,
        }
    }

    fn execute(self, _diag: &mut dyn Write) -> Result<Flow> {
        env::set_current_dir(&self.target).map_err(|source| ShellError::ChangeDir {
            path: self.target,
            source,
        })?;
        Ok(Flow::Continue)
    }
}

/// Leave the shell. Arguments are accepted and ignored.
pub(crate) struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn usage() -> &'static str {
        "exit takes no arguments"
    }

    fn parse(_args: &[&str]) -> Option<Self> {
        Some(Exit)
    }

    fn execute(self, _diag: &mut dyn Write) -> Result<Flow> {
        Ok(Flow::Exit(0))
    }
}
