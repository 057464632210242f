#![deny(unsafe_code)]

mod constants;
mod error;
mod logging;
mod process;
mod supervisor;
mod watcher;
mod x11;

use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info};

use crate::logging::LogOptions;
use crate::process::SystemFork;
use crate::supervisor::{Detached, TargetInvocation};
use crate::watcher::{ForkSpawner, Watcher};
use crate::x11::RootWindowSource;

#[derive(Parser, Debug)]
#[command(name = "rootwatch")]
#[command(version)]
#[command(
    about = "Run a program whenever the X11 root window changes geometry",
    long_about = None
)]
struct Cli {
    /// Seconds to wait after a geometry change before running the target
    #[arg(long, value_name = "SECONDS", default_value_t = constants::spawn::DEFAULT_DELAY_SECS)]
    delay: u64,

    /// Stay in the foreground instead of detaching a background watcher
    #[arg(long)]
    foreground: bool,

    /// Let the kernel reap finished children instead of leaving zombies
    #[arg(long)]
    reap: bool,

    /// Only log to syslog, not to stderr
    #[arg(short, long)]
    quiet: bool,

    /// Target executable followed by its arguments, passed through verbatim
    #[arg(
        value_name = "TARGET",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<OsString>,
}

/// Watcher settings that outlive argument parsing
#[derive(Debug, Clone, Copy)]
struct WatchOptions {
    delay: Duration,
    reap: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            init_logging(LogOptions { stderr: true });
            error!("{}", usage_error_line(&err));
            return ExitCode::from(constants::exit::FAILURE);
        }
    };

    init_logging(LogOptions { stderr: !cli.quiet });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(constants::exit::FAILURE)
        }
    }
}

fn init_logging(options: LogOptions) {
    if let Err(err) = logging::init(options) {
        eprintln!("Error: {err:#}");
    }
}

/// First line of a clap error, without the usage block that follows it
fn usage_error_line(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered.lines().next().unwrap_or_default().to_string()
}

fn run(cli: Cli) -> error::Result<()> {
    let invocation = TargetInvocation::capture(cli.command, std::env::vars_os())?;
    supervisor::validate_target(invocation.path())?;

    let options = WatchOptions {
        delay: Duration::from_secs(cli.delay),
        reap: cli.reap,
    };

    if cli.foreground {
        return watch(&invocation, options);
    }

    match supervisor::detach(&mut SystemFork)? {
        Detached::Invoker { worker } => {
            info!(pid = worker.as_raw(), "On background as {}, exiting", worker);
            Ok(())
        }
        Detached::Worker => watch(&invocation, options),
    }
}

/// Body of the background worker. Returns only on a fatal error.
fn watch(invocation: &TargetInvocation, options: WatchOptions) -> error::Result<()> {
    if options.reap {
        process::reap_children_automatically()?;
        info!("Finished children will be reaped automatically");
    }

    let source = RootWindowSource::open()?;
    let spawner = ForkSpawner::new(SystemFork, options.delay).reaping(options.reap);
    let mut watcher = Watcher::new(source, spawner, invocation);

    let Err(err) = watcher.run();
    Err(err)
}
