use std::path::PathBuf;

use thiserror::Error;

/// Why a single comfort field or preset was rejected. The rest of the
/// update still applies; these are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComfortError {
    #[error("{field} must be within ({min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} expects {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("unknown comfort setting '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not a valid {field}")]
    UnknownVariant { field: &'static str, value: String },

    #[error("unknown comfort preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read locomotion config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locomotion config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid locomotion config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
