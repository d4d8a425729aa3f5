//! Application run-mode.

use serde::{Serialize, Serializer};

/// Run-mode selected at startup.
///
/// Parsing never fails: unknown names are kept as [`RunMode::Unrecognized`]
/// so the factory can reject them with the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunMode {
    Development,
    Test,
    Production,
    Unrecognized(String),
}

impl RunMode {
    pub fn as_str(&self) -> &str {
        match self {
            RunMode::Development => "development",
            RunMode::Test => "test",
            RunMode::Production => "production",
            RunMode::Unrecognized(name) => name,
        }
    }

    /// Whether this is one of the three known modes.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, RunMode::Unrecognized(_))
    }

    /// Dotenv file read in this mode, if the mode is file-backed.
    pub fn env_file_name(&self) -> Option<String> {
        match self {
            RunMode::Development | RunMode::Test => Some(format!("{}.env", self.as_str())),
            RunMode::Production | RunMode::Unrecognized(_) => None,
        }
    }
}

impl From<&str> for RunMode {
    fn from(value: &str) -> Self {
        match value {
            "development" => RunMode::Development,
            "test" => RunMode::Test,
            "production" => RunMode::Production,
            other => RunMode::Unrecognized(other.to_string()),
        }
    }
}

impl std::str::FromStr for RunMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RunMode::from(s))
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for RunMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
