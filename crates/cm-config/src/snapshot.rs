//! Configuration snapshots for startup diagnostics.
//!
//! A snapshot records which source a configuration came from and what it
//! resolved to, so two deployments can be compared by hash without ever
//! printing the password.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::connection::{DatabaseEngine, DbConnectionConfig};
use crate::error::Result;
use crate::mode::RunMode;
use crate::source::{ConfigSource, SourceDescriptor};

/// A frozen record of resolved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Run-mode the configuration was resolved for.
    pub mode: RunMode,

    /// Where the values were read from.
    pub source: SourceDescriptor,

    /// SHA-256 of the redacted connection options.
    pub options_hash: String,

    /// Key values for quick reference.
    pub summary: ConnectionSummary,
}

/// Secret-free summary of a connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub engine: DatabaseEngine,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub schema: String,
    pub username: String,
    pub drop_schema: bool,
    pub migrations_run: bool,
}

impl ConfigSnapshot {
    /// Snapshot a validated configuration.
    pub fn capture<S: ConfigSource>(mode: &RunMode, config: &DbConnectionConfig<S>) -> Result<Self> {
        let options = config.connection_options()?.redacted();
        let canonical = serde_json::to_string(&options)?;

        Ok(ConfigSnapshot {
            timestamp: Utc::now(),
            mode: mode.clone(),
            source: config.source().describe(),
            options_hash: hash_content(&canonical),
            summary: ConnectionSummary {
                engine: options.engine,
                host: options.host,
                port: options.port,
                database: options.database,
                schema: options.schema,
                username: options.username,
                drop_schema: options.drop_schema,
                migrations_run: options.migrations_run,
            },
        })
    }

    /// Whether two snapshots resolved to the same options.
    pub fn same_options(&self, other: &ConfigSnapshot) -> bool {
        self.options_hash == other.options_hash
    }
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
