//! Logging bootstrap

use std::io::IsTerminal;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialise the global `tracing` subscriber, writing to stderr.
///
/// `level` is an `EnvFilter` directive (`warn`, `debug`,
/// `copilot_usage=trace`, ...); unrecognised values fall back to `warn`.
/// While the dashboard owns the terminal, log lines would draw over it, so
/// interactive runs only log when stderr is redirected.
pub fn setup_logging(level: &str, interactive: bool) -> anyhow::Result<()> {
    let directive = if interactive && std::io::stderr().is_terminal() {
        "off"
    } else {
        level
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}
