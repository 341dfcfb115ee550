//! Process-wide tracing setup for the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool, level: &str) -> String {
    if verbose {
        "pilot=debug".to_string()
    } else {
        format!("pilot={}", level.trim().to_lowercase())
    }
}

/// Install the global subscriber. Logs go to stderr so command output stays clean.
pub fn init(verbose: bool, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, &config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
