//! Logging setup.
//!
//! The terminal belongs to the UI, so events go to the configured log file
//! instead of stderr.

use crate::config::{LogFormat, TuiConfig};
use crate::error::TuiError;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(config: &TuiConfig) -> Result<(), TuiError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    let writer = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init(),
    };
    result.map_err(|e| TuiError::Telemetry(e.to_string()))?;

    tracing::info!(
        api_base_url = %config.api_base_url,
        log_format = ?config.log_format,
        "Logging initialized"
    );
    Ok(())
}
