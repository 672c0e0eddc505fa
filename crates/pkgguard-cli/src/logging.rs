//! Logging initialization for the CLI.
//!
//! Library crates only emit `tracing` events; the subscriber lives here and
//! always writes to stderr so logs never mix with report output on stdout.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `verbosity`: 0 = `RUST_LOG` or warn, 1 = info, 2 = debug, 3+ = trace.
pub fn init(verbosity: u8, json: bool) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::registry().with(filter);
    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("initialize logging")
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .context("initialize logging")
    }
}
