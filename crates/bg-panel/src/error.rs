//! Panel validation errors.

use std::fmt;

use thiserror::Error;

use crate::analyte::Analyte;
use crate::units::UnitError;

/// Result type for panel operations.
pub type PanelResult<T> = Result<T, PanelError>;

/// Which plausibility limit a value broke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundViolation {
    Lower(f64),
    Upper(f64),
}

impl BoundViolation {
    pub fn limit(self) -> f64 {
        match self {
            Self::Lower(v) | Self::Upper(v) => v,
        }
    }
}

impl fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lower(v) => write!(f, "lower plausibility bound {v}"),
            Self::Upper(v) => write!(f, "upper plausibility bound {v}"),
        }
    }
}

/// Errors raised while building a [`ValuePanel`](crate::ValuePanel).
#[derive(Error, Debug)]
pub enum PanelError {
    /// A present value is physiologically implausible.
    #[error("{analyte} = {value} violates {bound}")]
    OutOfBounds {
        analyte: Analyte,
        value: f64,
        bound: BoundViolation,
    },

    #[error("Unknown analyte key '{key}'")]
    UnknownAnalyte { key: String },

    /// Two keys resolved to the same analyte (e.g. `HCO3` and `bicarbonate`).
    #[error("Analyte {analyte} supplied more than once (key '{key}')")]
    DuplicateAnalyte { analyte: Analyte, key: String },

    #[error("Non-finite value for {analyte}: {value}")]
    NonFinite { analyte: Analyte, value: f64 },

    #[error("Could not read {analyte}: {source}")]
    Unit {
        analyte: Analyte,
        #[source]
        source: UnitError,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidContext { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported panel file '{path}': expected .json, .yaml or .yml")]
    UnsupportedFile { path: String },
}

impl PanelError {
    /// Analyte named by the error, if any.
    pub fn analyte(&self) -> Option<Analyte> {
        match self {
            Self::OutOfBounds { analyte, .. }
            | Self::DuplicateAnalyte { analyte, .. }
            | Self::NonFinite { analyte, .. }
            | Self::Unit { analyte, .. } => Some(*analyte),
            _ => None,
        }
    }
}
