//! Configuration sources.
//!
//! A source turns some external input into an [`EnvironmentMap`]:
//! - [`FileBackedConfig`] parses a dotenv file (development and test)
//! - [`LiveEnvironmentConfig`] copies the connection keys out of an
//!   [`EnvSnapshot`] (production)
//!
//! [`SourceKind`] is the closed set the factory chooses from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::env_map::{EnvSnapshot, EnvironmentMap};
use crate::error::{ConfigError, Result};
use crate::CONNECTION_KEYS;

/// Something that can produce a raw environment map.
pub trait ConfigSource {
    /// Produce a fresh map. Called once per validation attempt.
    fn load(&self) -> Result<EnvironmentMap>;

    /// Where the values come from, for diagnostics.
    fn describe(&self) -> SourceDescriptor;
}

/// Diagnostic description of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
    /// Values read from a dotenv file.
    DotenvFile { path: String },
    /// Values copied from the process environment.
    Environment { keys: Vec<String> },
}

impl std::fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceDescriptor::DotenvFile { path } => write!(f, "dotenv file {}", path),
            SourceDescriptor::Environment { .. } => write!(f, "process environment"),
        }
    }
}

/// Reads `KEY=VALUE` lines from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBackedConfig {
    path: PathBuf,
}

impl FileBackedConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackedConfig { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileBackedConfig {
    fn load(&self) -> Result<EnvironmentMap> {
        let origin = self.path.display().to_string();
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Source {
            origin: origin.clone(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|err| ConfigError::MalformedSource {
            origin: origin.clone(),
            detail: format!("not valid UTF-8 ({})", err.utf8_error()),
        })?;

        let map = EnvironmentMap::parse_dotenv(&content);
        tracing::debug!(
            target: "config.source_loaded",
            path = %origin,
            entries = map.len(),
            "loaded dotenv file"
        );
        Ok(map)
    }

    fn describe(&self) -> SourceDescriptor {
        SourceDescriptor::DotenvFile {
            path: self.path.display().to_string(),
        }
    }
}

/// Copies the connection keys from an environment snapshot.
///
/// Only [`CONNECTION_KEYS`] are read. A key missing from the snapshot is
/// carried as unset rather than defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEnvironmentConfig {
    env: EnvSnapshot,
}

impl LiveEnvironmentConfig {
    pub fn new(env: EnvSnapshot) -> Self {
        LiveEnvironmentConfig { env }
    }

    /// Source over the environment of the running process.
    pub fn from_process() -> Self {
        LiveEnvironmentConfig::new(EnvSnapshot::capture())
    }
}

impl ConfigSource for LiveEnvironmentConfig {
    fn load(&self) -> Result<EnvironmentMap> {
        let mut map = EnvironmentMap::new();
        for key in CONNECTION_KEYS {
            match self.env.get(key) {
                Some(value) => map.insert(key, value),
                None => map.insert_unset(key),
            }
        }
        Ok(map)
    }

    fn describe(&self) -> SourceDescriptor {
        SourceDescriptor::Environment {
            keys: CONNECTION_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The sources the factory can select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    File(FileBackedConfig),
    Environment(LiveEnvironmentConfig),
}

impl ConfigSource for SourceKind {
    fn load(&self) -> Result<EnvironmentMap> {
        match self {
            SourceKind::File(source) => source.load(),
            SourceKind::Environment(source) => source.load(),
        }
    }

    fn describe(&self) -> SourceDescriptor {
        match self {
            SourceKind::File(source) => source.describe(),
            SourceKind::Environment(source) => source.describe(),
        }
    }
}

impl From<FileBackedConfig> for SourceKind {
    fn from(source: FileBackedConfig) -> Self {
        SourceKind::File(source)
    }
}

impl From<LiveEnvironmentConfig> for SourceKind {
    fn from(source: LiveEnvironmentConfig) -> Self {
        SourceKind::Environment(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_reads_pairs() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"DB_HOST=localhost\nDB_PORT=5432\n").unwrap();

        let source = FileBackedConfig::new(tmp.path());
        let map = source.load().expect("load");
        assert_eq!(map.get("DB_HOST"), Some("localhost"));
        assert_eq!(map.get("DB_PORT"), Some("5432"));
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileBackedConfig::new(dir.path().join("development.env"));
        let err = source.load().expect_err("missing file");
        match err {
            ConfigError::Source { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_source_rejects_invalid_utf8() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"DB_HOST=db\nDB_PASSWORD=\xff\xfe\n").unwrap();

        let err = FileBackedConfig::new(tmp.path()).load().expect_err("invalid utf-8");
        assert!(matches!(err, ConfigError::MalformedSource { .. }));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_file_source_values_are_literal() {
        std::env::set_var("CM_SOURCE_TEST_LEAK", "FROMPROC");
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"DB_PASSWORD=pa$CM_SOURCE_TEST_LEAK\nDB_USER=ab #cd\n")
            .unwrap();

        let map = FileBackedConfig::new(tmp.path()).load().expect("load");
        assert_eq!(map.get("DB_PASSWORD"), Some("pa$CM_SOURCE_TEST_LEAK"));
        assert_eq!(map.get("DB_USER"), Some("ab #cd"));
    }

    #[test]
    fn test_environment_source_copies_allow_list_only() {
        let env: EnvSnapshot = [
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "5432"),
            ("HOME", "/root"),
        ]
        .into_iter()
        .collect();

        let map = LiveEnvironmentConfig::new(env).load().unwrap();
        assert_eq!(map.len(), CONNECTION_KEYS.len());
        assert_eq!(map.get("DB_HOST"), Some("db.internal"));
        assert!(!map.contains_key("HOME"));
        // Absent keys are carried through unset.
        assert!(map.contains_key("DB_PASSWORD"));
        assert_eq!(map.get("DB_PASSWORD"), None);
    }

    #[test]
    fn test_source_kind_dispatch() {
        let kind = SourceKind::from(LiveEnvironmentConfig::new(EnvSnapshot::default()));
        assert_eq!(kind.load().unwrap().len(), CONNECTION_KEYS.len());
        assert_eq!(kind.describe().to_string(), "process environment");

        let kind = SourceKind::from(FileBackedConfig::new("test.env"));
        assert_eq!(kind.describe().to_string(), "dotenv file test.env");
    }
}
