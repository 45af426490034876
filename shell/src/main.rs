use anyhow::Context;
use argh::FromArgs;
use tinysh::config::{EXEC_FAILURE_STATUS, GROWTH_INCREMENT, MAX_TOKENS, PROMPT};
use tinysh::{Config, Interpreter, Interrupt};

#[derive(FromArgs)]
/// A minimal interactive command interpreter.
struct Options {
    #[argh(option, short = 'p', default = "PROMPT.to_string()")]
    /// marker written to stderr before every line.
    prompt: String,

    #[argh(option, default = "GROWTH_INCREMENT")]
    /// bytes added to the line buffer when a line outgrows it.
    growth_increment: usize,

    #[argh(option, default = "MAX_TOKENS")]
    /// a line must have fewer tokens than this.
    max_tokens: usize,

    #[argh(option, default = "EXEC_FAILURE_STATUS")]
    /// exit status of a child whose executable could not be started.
    exec_failure_status: i32,

    #[argh(switch, short = 'v')]
    /// log interpreter activity to stderr.
    verbose: bool,
}

impl From<Options> for Config {
    fn from(options: Options) -> Self {
        Config {
            prompt: options.prompt,
            growth_increment: options.growth_increment,
            max_tokens: options.max_tokens,
            exec_failure_status: options.exec_failure_status,
        }
    }
}

fn run(options: Options) -> anyhow::Result<i32> {
    tinysh::logging::init_tracing(options.verbose);

    let config = Config::from(options);
    config.validate()?;

    let interrupt = Interrupt::new();
    interrupt
        .install()
        .context("cannot handle interactive interrupts")?;

    let interpreter = Interpreter::new(config, interrupt);
    let mut input = std::io::stdin().lock();
    let mut diag = std::io::stderr();
    Ok(interpreter.run(&mut input, &mut diag)?)
}

fn main() {
    let options: Options = argh::from_env();
    let code = match run(options) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(code);
}
