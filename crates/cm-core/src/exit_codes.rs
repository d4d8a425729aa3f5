//! Exit codes for the cm-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0: configuration resolved
//! - 10-19: user/environment errors (fixable by editing env or dotenv files)
//! - 20-29: internal errors (bugs, should be reported)

use cm_config::{ConfigError, ErrorKind};

/// Exit codes for cm-core operations.
///
/// These codes are a stable contract for deployment scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Configuration resolved and validated.
    Clean = 0,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Run-mode unset or not recognised
    EnvironmentError = 11,

    /// Dotenv file missing, unreadable or malformed
    SourceError = 12,

    /// A connection variable is missing, empty or mistyped
    ValidationError = 13,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Error code name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::EnvironmentError => "ERR_ENVIRONMENT",
            ExitCode::SourceError => "ERR_SOURCE",
            ExitCode::ValidationError => "ERR_VALIDATION",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(error: &ConfigError) -> Self {
        match error.kind() {
            ErrorKind::Source => ExitCode::SourceError,
            ErrorKind::Validation => ExitCode::ValidationError,
            ErrorKind::Environment => ExitCode::EnvironmentError,
            // Options requested before validation is a bug in the caller.
            ErrorKind::State => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        for code in [
            ExitCode::ArgsError,
            ExitCode::EnvironmentError,
            ExitCode::SourceError,
            ExitCode::ValidationError,
        ] {
            assert!((10..20).contains(&code.as_i32()), "{code}");
        }
        assert_eq!(ExitCode::InternalError.as_i32(), 20);
    }

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::validation("DB_PORT", "must be a number");
        assert_eq!(ExitCode::from(&err), ExitCode::ValidationError);

        let err = ConfigError::UnrecognizedEnvironment {
            mode: Some("staging".to_string()),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::EnvironmentError);

        let err = ConfigError::MalformedSource {
            origin: "test.env".to_string(),
            detail: "bad line".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::SourceError);

        assert_eq!(ExitCode::from(&ConfigError::NotValidated), ExitCode::InternalError);

        let err = ConfigError::from(serde_json::from_str::<u16>("x").unwrap_err());
        assert_eq!(ExitCode::from(&err), ExitCode::InternalError);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::SourceError.to_string(), "ERR_SOURCE (12)");
        assert_eq!(i32::from(ExitCode::Clean), 0);
    }
}
