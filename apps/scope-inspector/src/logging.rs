use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so that command output on stdout stays machine-readable.
///
/// # Errors
///
/// Fails on an invalid filter directive or if a subscriber is already set.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log filter `{}`", cfg.level))?;

    let json = cfg.json.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let plain = (!cfg.json).then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!(level = %cfg.level, json = cfg.json, "logging initialized");
    Ok(())
}
