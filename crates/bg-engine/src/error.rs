//! Engine errors.
//!
//! Interpretation itself never fails: missing inputs become
//! "not computable"/"insufficient data" markers inside the result. Errors here
//! cover the surfaces around it (configuration and the panel boundary).

use bg_core::BgError;
use bg_panel::PanelError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {what} ({reason})")]
    InvalidConfig { what: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] BgError),

    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
