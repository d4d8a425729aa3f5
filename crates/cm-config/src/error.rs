//! Configuration errors.
//!
//! Three failure families abort startup: the source could not be read,
//! the values failed schema validation, or the run-mode is not one we know.
//! None of them is retried here; the bootstrap decides what to do.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Coarse error classification, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file or environment could not be read or parsed.
    Source,
    /// A required key is missing, empty, or mistyped.
    Validation,
    /// The run-mode indicator is unset or unknown.
    Environment,
    /// The configuration was used before it was validated, or could not
    /// be serialized.
    State,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Source => write!(f, "source"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Environment => write!(f, "environment"),
            ErrorKind::State => write!(f, "state"),
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration from {origin}: {source}")]
    Source {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration in {origin}: {detail}")]
    MalformedSource { origin: String, detail: String },

    #[error("config validation error: \"{field}\" {reason}")]
    Validation { field: String, reason: String },

    #[error("{}", describe_mode(.mode.as_deref()))]
    UnrecognizedEnvironment { mode: Option<String> },

    #[error("connection options requested before the configuration was validated")]
    NotValidated,

    #[error("failed to serialize connection options: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_mode(mode: Option<&str>) -> String {
    match mode {
        Some(mode) => format!("{} is not a recognised environment", mode),
        None => format!("environment variable {} is not set", crate::RUN_MODE_VAR),
    }
}

impl ConfigError {
    /// Build a validation error for `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Error family.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Source { .. } | ConfigError::MalformedSource { .. } => ErrorKind::Source,
            ConfigError::Validation { .. } => ErrorKind::Validation,
            ConfigError::UnrecognizedEnvironment { .. } => ErrorKind::Environment,
            ConfigError::NotValidated | ConfigError::Serialization(_) => ErrorKind::State,
        }
    }

    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Source { .. } => 10,
            ConfigError::MalformedSource { .. } => 11,
            ConfigError::Validation { .. } => 12,
            ConfigError::UnrecognizedEnvironment { .. } => 13,
            ConfigError::NotValidated => 14,
            ConfigError::Serialization(_) => 15,
        }
    }

    /// Offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
