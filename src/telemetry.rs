//! Logging setup.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Failed to create log filter")?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_logs {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .context("Failed to install JSON log subscriber")?;
    } else {
        registry
            .with(fmt::layer().compact().with_target(false))
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    Ok(())
}
