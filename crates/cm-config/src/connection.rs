//! Database connection configuration.
//!
//! [`DbConnectionConfig`] combines fixed connection properties (name,
//! entities, migration globs) with the target populated from a validated
//! source. The target is all-or-nothing: either `validate()` succeeded and
//! every environment-derived field is set, or none is.

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::schema::{ValidatedEnv, DB_CONNECTION_SCHEMA};
use crate::source::{ConfigSource, SourceKind};
use crate::{DB_HOST, DB_NAME, DB_PASSWORD, DB_PORT, DB_SCHEMA, DB_USER};

/// Connection identifier handed to the ORM.
pub const CONNECTION_NAME: &str = "default";

/// Entities registered with the connection.
pub const ENTITIES: [&str; 1] = ["Course"];

/// Migration globs: compiled output first, then sources for the CLI.
pub const MIGRATION_PATTERNS: [&str; 2] = [
    "dist/database/migrations/**/*.js",
    "../../../src/database/migrations/**/*.ts",
];

/// Replacement shown instead of the password in diagnostics.
pub const REDACTED: &str = "********";

/// Database engine tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgres,
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseEngine::Postgres => write!(f, "postgres"),
        }
    }
}

/// Directories used by the ORM command line when generating code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliDirs {
    pub entities_dir: String,
    pub migrations_dir: String,
}

impl Default for CliDirs {
    fn default() -> Self {
        CliDirs {
            entities_dir: "src/course".to_string(),
            migrations_dir: "src/database/migrations".to_string(),
        }
    }
}

/// Environment-derived connection target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub schema: String,
}

impl ConnectionTarget {
    /// Build a target from schema-validated values.
    pub fn from_validated(env: &ValidatedEnv) -> Result<Self> {
        let port = env.integer(DB_PORT)?;
        let port = u16::try_from(port).map_err(|_| {
            ConfigError::validation(DB_PORT, format!("{} is not a valid port", port))
        })?;

        Ok(ConnectionTarget {
            host: env.text(DB_HOST)?.to_string(),
            port,
            database: env.text(DB_NAME)?.to_string(),
            username: env.text(DB_USER)?.to_string(),
            password: env.text(DB_PASSWORD)?.to_string(),
            schema: env.text(DB_SCHEMA)?.to_string(),
        })
    }
}

/// Connection configuration bound to a source.
#[derive(Debug, Clone)]
pub struct DbConnectionConfig<S = SourceKind> {
    source: S,
    name: String,
    entities: Vec<String>,
    migrations: Vec<String>,
    migrations_run: bool,
    cli: CliDirs,
    synchronize: bool,
    logging: bool,
    drop_schema: bool,
    engine: DatabaseEngine,
    target: Option<ConnectionTarget>,
}

impl<S: ConfigSource> DbConnectionConfig<S> {
    /// Create an unvalidated configuration reading from `source`.
    pub fn new(source: S) -> Self {
        DbConnectionConfig {
            source,
            name: CONNECTION_NAME.to_string(),
            entities: ENTITIES.iter().map(|e| e.to_string()).collect(),
            migrations: MIGRATION_PATTERNS.iter().map(|m| m.to_string()).collect(),
            migrations_run: true,
            cli: CliDirs::default(),
            synchronize: false,
            logging: false,
            drop_schema: false,
            engine: DatabaseEngine::Postgres,
            target: None,
        }
    }

    /// Load the source, validate it, and populate the connection target.
    ///
    /// On error the configuration is left exactly as it was, so a caller
    /// may fix the source and call again.
    pub fn validate(&mut self) -> Result<()> {
        let env = self.source.load()?;
        let validated = DB_CONNECTION_SCHEMA.validate(&env)?;
        let target = ConnectionTarget::from_validated(&validated)?;

        tracing::debug!(
            target: "config.validated",
            source = %self.source.describe(),
            host = %target.host,
            port = target.port,
            "connection configuration validated"
        );
        self.target = Some(target);
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.target.is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> Option<&ConnectionTarget> {
        self.target.as_ref()
    }

    pub fn host(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.host.as_str())
    }

    pub fn port(&self) -> Option<u16> {
        self.target.as_ref().map(|t| t.port)
    }

    pub fn database(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.database.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.username.as_str())
    }

    pub fn password(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.password.as_str())
    }

    pub fn schema(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.schema.as_str())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn migrations(&self) -> &[String] {
        &self.migrations
    }

    pub fn migrations_run(&self) -> bool {
        self.migrations_run
    }

    pub fn cli(&self) -> &CliDirs {
        &self.cli
    }

    pub fn synchronize(&self) -> bool {
        self.synchronize
    }

    pub fn logging(&self) -> bool {
        self.logging
    }

    pub fn drop_schema(&self) -> bool {
        self.drop_schema
    }

    pub fn engine(&self) -> DatabaseEngine {
        self.engine
    }

    /// Whether the schema is dropped and recreated on connect.
    pub fn set_drop_schema(&mut self, drop_schema: bool) {
        self.drop_schema = drop_schema;
    }

    /// Options bag for the ORM bootstrap.
    pub fn connection_options(&self) -> Result<ConnectionOptions> {
        let target = self.target.as_ref().ok_or(ConfigError::NotValidated)?;

        Ok(ConnectionOptions {
            engine: self.engine,
            name: self.name.clone(),
            host: target.host.clone(),
            port: target.port,
            database: target.database.clone(),
            username: target.username.clone(),
            password: target.password.clone(),
            schema: target.schema.clone(),
            entities: self.entities.clone(),
            migrations: self.migrations.clone(),
            migrations_run: self.migrations_run,
            cli: self.cli.clone(),
            synchronize: self.synchronize,
            logging: self.logging,
            drop_schema: self.drop_schema,
        })
    }
}

/// Connection options as consumed by the ORM bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionOptions {
    #[serde(rename = "type")]
    pub engine: DatabaseEngine,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub schema: String,
    pub entities: Vec<String>,
    pub migrations: Vec<String>,
    pub migrations_run: bool,
    pub cli: CliDirs,
    pub synchronize: bool,
    pub logging: bool,
    pub drop_schema: bool,
}

impl ConnectionOptions {
    /// Copy with the password masked, for logs and terminal output.
    pub fn redacted(&self) -> Self {
        ConnectionOptions {
            password: REDACTED.to_string(),
            ..self.clone()
        }
    }

    /// Copy for running migrations by hand: never drops the schema, never
    /// auto-runs migrations, and keeps ORM query logging off.
    pub fn for_migration_driver(&self) -> Self {
        ConnectionOptions {
            drop_schema: false,
            logging: false,
            migrations_run: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_map::EnvSnapshot;
    use crate::source::LiveEnvironmentConfig;

    fn env() -> EnvSnapshot {
        [
            ("DB_HOST", "localhost"),
            ("DB_NAME", "db"),
            ("DB_PASSWORD", "pw"),
            ("DB_PORT", "5432"),
            ("DB_SCHEMA", "s"),
            ("DB_USER", "u"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_defaults_before_validation() {
        let config = DbConnectionConfig::new(LiveEnvironmentConfig::new(env()));
        assert!(!config.is_validated());
        assert_eq!(config.host(), None);
        assert_eq!(config.port(), None);
        assert_eq!(config.name(), "default");
        assert_eq!(config.entities().len(), 1);
        assert_eq!(config.migrations().len(), 2);
        assert!(config.migrations_run());
        assert!(!config.synchronize());
        assert!(!config.logging());
        assert!(!config.drop_schema());
        assert_eq!(config.engine(), DatabaseEngine::Postgres);
    }

    #[test]
    fn test_validate_populates_target() {
        let mut config = DbConnectionConfig::new(LiveEnvironmentConfig::new(env()));
        config.validate().expect("valid");
        assert_eq!(config.host(), Some("localhost"));
        assert_eq!(config.port(), Some(5432));
        assert_eq!(config.database(), Some("db"));
        assert_eq!(config.username(), Some("u"));
        assert_eq!(config.password(), Some("pw"));
        assert_eq!(config.schema(), Some("s"));
    }

    #[test]
    fn test_failed_validation_leaves_config_untouched() {
        let broken = env().with_var("DB_PORT", "port");
        let mut config = DbConnectionConfig::new(LiveEnvironmentConfig::new(broken));
        assert!(config.validate().is_err());
        assert!(!config.is_validated());
        assert!(matches!(
            config.connection_options(),
            Err(ConfigError::NotValidated)
        ));
    }

    #[test]
    fn test_connection_options_serialization() {
        let mut config = DbConnectionConfig::new(LiveEnvironmentConfig::new(env()));
        config.validate().unwrap();
        config.set_drop_schema(true);

        let value = serde_json::to_value(config.connection_options().unwrap()).unwrap();
        assert_eq!(value["type"], "postgres");
        assert_eq!(value["name"], "default");
        assert_eq!(value["port"], 5432);
        assert_eq!(value["dropSchema"], true);
        assert_eq!(value["migrationsRun"], true);
        assert_eq!(value["cli"]["entitiesDir"], "src/course");
        assert_eq!(value["migrations"].as_array().map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_redacted_hides_password() {
        let mut config = DbConnectionConfig::new(LiveEnvironmentConfig::new(env()));
        config.validate().unwrap();
        let options = config.connection_options().unwrap();
        let redacted = options.redacted();
        assert_eq!(redacted.password, REDACTED);
        assert_eq!(redacted.host, options.host);
    }

    #[test]
    fn test_migration_driver_overrides() {
        let mut config = DbConnectionConfig::new(LiveEnvironmentConfig::new(env()));
        config.validate().unwrap();
        config.set_drop_schema(true);

        let driver = config.connection_options().unwrap().for_migration_driver();
        assert!(!driver.drop_schema);
        assert!(!driver.logging);
        assert!(!driver.migrations_run);
        assert_eq!(driver.database, "db");
    }
}
