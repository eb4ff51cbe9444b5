//! Error types for the TUI.

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use leadpilot_core::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
}
