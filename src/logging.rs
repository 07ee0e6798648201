//! Logging setup
//!
//! Diagnostics are `tracing` events written to stderr. The level comes
//! from, in order: `--log-level`, `UMLIZER_LOG`, `RUST_LOG`, then the
//! default (`warn`, or `info` with `--verbose` so inclusion lines show).
//!
//! ```bash
//! # Trace resolution for one module
//! UMLIZER_LOG="warn,umlizer::parser=debug" umlizer class ./src
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV: &str = "UMLIZER_LOG";

/// Pick the filter directive for this run
pub fn resolve_level(
    level: Option<&str>,
    umlizer_log: Option<String>,
    rust_log: Option<String>,
    verbose: bool,
) -> String {
    level
        .map(|s| s.to_string())
        .or(umlizer_log)
        .or(rust_log)
        .unwrap_or_else(|| if verbose { "info" } else { "warn" }.to_string())
}

/// Initialize the global subscriber
pub fn init_logging(level: Option<&str>, verbose: bool) -> Result<()> {
    let directive = resolve_level(
        level,
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        verbose,
    );

    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| Error::config_validation(format!("invalid log level '{}': {}", directive, e)))?;

    Registry::default()
        .with(filter)
        .with(
            fmt::Layer::default()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .without_time(),
        )
        .try_init()
        .map_err(|e| Error::other(format!("failed to initialize logging: {}", e)))
}
