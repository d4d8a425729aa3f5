//! Course Manager configuration loading and validation.
//!
//! This crate provides:
//! - Dotenv-file and live-environment configuration sources
//! - Schema validation of the database connection variables
//! - Run-mode dispatch (development / test / production)
//! - A read-only service handing connection options to the ORM bootstrap
//! - Config snapshots for startup diagnostics

pub mod connection;
pub mod env_map;
pub mod error;
pub mod factory;
pub mod mode;
pub mod schema;
pub mod service;
pub mod snapshot;
pub mod source;

pub use connection::{ConnectionOptions, ConnectionTarget, DbConnectionConfig};
pub use env_map::{EnvSnapshot, EnvironmentMap};
pub use error::{ConfigError, ErrorKind, Result};
pub use factory::{make_config, ConfigFactory, DropSchemaPolicy};
pub use mode::RunMode;
pub use schema::{ValidatedEnv, ValidationSchema, DB_CONNECTION_SCHEMA};
pub use service::{ConfigOptions, ConfigService, ConfigServiceFactory, Logger};
pub use snapshot::ConfigSnapshot;
pub use source::{ConfigSource, FileBackedConfig, LiveEnvironmentConfig, SourceKind};

/// Environment variable carrying the run-mode.
pub const RUN_MODE_VAR: &str = "NODE_ENV";

/// Database host name.
pub const DB_HOST: &str = "DB_HOST";
/// Database (catalog) name.
pub const DB_NAME: &str = "DB_NAME";
/// Password for `DB_USER`.
pub const DB_PASSWORD: &str = "DB_PASSWORD";
/// TCP port of the database server.
pub const DB_PORT: &str = "DB_PORT";
/// Schema holding the course tables.
pub const DB_SCHEMA: &str = "DB_SCHEMA";
/// Login role.
pub const DB_USER: &str = "DB_USER";

/// Keys read from the live environment, in schema order.
pub const CONNECTION_KEYS: [&str; 6] = [DB_HOST, DB_NAME, DB_PASSWORD, DB_PORT, DB_SCHEMA, DB_USER];
