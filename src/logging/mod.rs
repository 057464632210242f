//! Logging setup
//!
//! Everything is logged through `tracing`. Records always reach syslog; they
//! are mirrored to stderr unless the caller asked for quiet. `RUST_LOG`
//! overrides the default `info` filter.

#[cfg(test)]
pub mod capture;
mod syslog;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use syslog::SyslogLayer;

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy)]
pub struct LogOptions {
    pub stderr: bool,
}

/// Install the global subscriber. Must run before the first fork so every
/// process inherits it.
pub fn init(options: LogOptions) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Invalid log filter")?;

    let stderr = options.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(SyslogLayer::open())
        .with(stderr)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(())
}
