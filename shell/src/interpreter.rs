use crate::buffer::{HeapAllocator, LineBuffer, RegionAllocator};
use crate::builtin::Builtin;
use crate::command::{ExitCode, Flow};
use crate::config::Config;
use crate::error::{Result, ShellError, report};
use crate::launcher;
use crate::reaper;
use crate::session::{Release, Session};
use crate::signals::Interrupt;
use crate::tokenizer::tokenize;
use std::io::{Read, Write};
use tracing::trace;

/// Where the loop currently is; only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Reading,
    BuiltinDispatch,
    ProcessDispatch,
    Reaping,
}

enum Step {
    Continue,
    Stop(Release),
}

/// A minimal interactive command interpreter.
///
/// Each iteration prompts, reads one line, runs it either as a builtin or as
/// a child process, and then reaps every child before prompting again.
///
/// Example
/// ```
/// use tinysh::{Config, Interpreter, Interrupt};
/// let sh = Interpreter::new(Config::default(), Interrupt::new());
/// let mut diag = Vec::new();
/// let code = sh.run(&mut "exit\n".as_bytes(), &mut diag).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter<A: RegionAllocator = HeapAllocator> {
    config: Config,
    session: Session<A>,
}

impl Interpreter {
    pub fn new(config: Config, interrupt: Interrupt) -> Self {
        Self::with_allocator(config, interrupt, HeapAllocator)
    }
}

impl<A: RegionAllocator> Interpreter<A> {
    /// Create an interpreter whose line buffer draws regions from `allocator`.
    pub fn with_allocator(config: Config, interrupt: Interrupt, allocator: A) -> Self {
        let buffer = LineBuffer::with_allocator(allocator, config.growth_increment);
        Self {
            session: Session::new(buffer, interrupt),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until end of input, `exit` or an interrupt.
    ///
    /// Prompts and diagnostics go to `diag`. Returns the exit status for the
    /// process; an `Err` is always fatal and has not been reported yet. The
    /// session is released exactly once on every path.
    pub fn run(mut self, input: &mut dyn Read, diag: &mut dyn Write) -> Result<ExitCode> {
        loop {
            match self.step(input, diag) {
                Ok(Step::Continue) => {}
                Ok(Step::Stop(reason)) => return Ok(self.session.release(reason)),
                Err(err) => {
                    self.session.release(Release::Fatal);
                    return Err(err);
                }
            }
        }
    }

    /// One pass of prompt, read, dispatch and reap.
    fn step(&mut self, input: &mut dyn Read, diag: &mut dyn Write) -> Result<Step> {
        transition(State::Idle);
        let Session { buffer, interrupt } = &mut self.session;

        let reading = interrupt.reading();
        // Checked after raising the reading flag so a signal cannot slip in
        // between the check and the blocking read.
        if interrupt.is_requested() {
            return Ok(Step::Stop(Release::Interrupted));
        }

        write!(diag, "{}", self.config.prompt)
            .and_then(|()| diag.flush())
            .map_err(ShellError::Write)?;

        transition(State::Reading);
        let read = loop {
            match buffer.next_line(input) {
                Err(ShellError::Interrupted) if !interrupt.is_requested() => continue,
                other => break other,
            }
        };
        drop(reading);

        match read {
            Ok(true) => {}
            Ok(false) => return Ok(Step::Stop(Release::EndOfInput)),
            Err(ShellError::Interrupted) => return Ok(Step::Stop(Release::Interrupted)),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                report(diag, &err)?;
                return Ok(Step::Stop(Release::ReadError));
            }
        }

        let flow = match execute_line(&self.config, buffer.line(), diag) {
            Ok(flow) => flow,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                report(diag, &err)?;
                Flow::Continue
            }
        };
        if let Flow::Exit(code) = flow {
            return Ok(Step::Stop(Release::Exit(code)));
        }

        transition(State::Reaping);
        reaper::reap_all(self.config.exec_failure_status, diag)?;

        if interrupt.is_requested() {
            return Ok(Step::Stop(Release::Interrupted));
        }
        Ok(Step::Continue)
    }
}

fn transition(state: State) {
    trace!(?state, "interpreter state");
}

/// Tokenize `line` and run it as a builtin or an external command.
fn execute_line(config: &Config, line: &[u8], diag: &mut dyn Write) -> Result<Flow> {
    let line = std::str::from_utf8(line).map_err(|_| ShellError::NotUtf8)?;
    let argv = tokenize(line, config.max_tokens)?;
    let Some(program) = argv.program() else {
        return Ok(Flow::Continue);
    };

    if let Some(builtin) = Builtin::lookup(program) {
        transition(State::BuiltinDispatch);
        return builtin.run(argv.args(), diag);
    }

    transition(State::ProcessDispatch);
    launcher::launch(&argv, config.exec_failure_status)?;
    Ok(Flow::Continue)
}
