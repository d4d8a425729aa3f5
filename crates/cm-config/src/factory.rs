//! Run-mode dispatch.
//!
//! | mode        | source                          | drop schema |
//! |-------------|---------------------------------|-------------|
//! | development | `<env_dir>/development.env`     | yes         |
//! | test        | `<env_dir>/test.env`            | yes         |
//! | production  | process environment snapshot    | no          |
//!
//! An unset or unknown mode is an error. There is no fallback mode.

use std::path::{Path, PathBuf};

use crate::connection::DbConnectionConfig;
use crate::env_map::EnvSnapshot;
use crate::error::{ConfigError, Result};
use crate::mode::RunMode;
use crate::source::{FileBackedConfig, LiveEnvironmentConfig, SourceKind};

/// When the factory marks the schema to be dropped on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropSchemaPolicy {
    /// Drop and recreate in development and test.
    #[default]
    NonProduction,
    /// Never drop, whatever the mode.
    Never,
}

/// Builds validated connection configurations for a run-mode.
#[derive(Debug, Clone)]
pub struct ConfigFactory {
    env_dir: PathBuf,
    drop_schema_policy: DropSchemaPolicy,
}

impl Default for ConfigFactory {
    fn default() -> Self {
        ConfigFactory::new(".")
    }
}

impl ConfigFactory {
    /// Factory reading `<mode>.env` files from `env_dir`.
    pub fn new(env_dir: impl Into<PathBuf>) -> Self {
        ConfigFactory {
            env_dir: env_dir.into(),
            drop_schema_policy: DropSchemaPolicy::default(),
        }
    }

    pub fn with_drop_schema_policy(mut self, policy: DropSchemaPolicy) -> Self {
        self.drop_schema_policy = policy;
        self
    }

    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    pub fn drop_schema_policy(&self) -> DropSchemaPolicy {
        self.drop_schema_policy
    }

    /// Whether configurations built for `mode` drop the schema on connect.
    pub fn drops_schema(&self, mode: &RunMode) -> bool {
        match self.drop_schema_policy {
            DropSchemaPolicy::NonProduction => {
                matches!(mode, RunMode::Development | RunMode::Test)
            }
            DropSchemaPolicy::Never => false,
        }
    }

    /// Source used for `mode`.
    pub fn source_for(&self, mode: &RunMode, env: &EnvSnapshot) -> Result<SourceKind> {
        match mode {
            RunMode::Development | RunMode::Test => {
                let file_name = format!("{}.env", mode.as_str());
                Ok(FileBackedConfig::new(self.env_dir.join(file_name)).into())
            }
            RunMode::Production => Ok(LiveEnvironmentConfig::new(env.clone()).into()),
            RunMode::Unrecognized(name) => Err(ConfigError::UnrecognizedEnvironment {
                mode: Some(name.clone()),
            }),
        }
    }

    /// Select the source for `mode`, validate it, and apply the drop-schema
    /// policy.
    pub fn make_config(
        &self,
        mode: Option<&RunMode>,
        env: &EnvSnapshot,
    ) -> Result<DbConnectionConfig> {
        let mode = mode.ok_or(ConfigError::UnrecognizedEnvironment { mode: None })?;
        let source = self.source_for(mode, env)?;

        let mut config = DbConnectionConfig::new(source);
        config.validate()?;

        if self.drops_schema(mode) {
            tracing::warn!(
                target: "config.drop_schema",
                mode = %mode,
                "schema will be dropped and recreated on connect"
            );
            config.set_drop_schema(true);
        }

        tracing::debug!(
            target: "config.loaded",
            mode = %mode,
            drop_schema = config.drop_schema(),
            "connection configuration resolved"
        );
        Ok(config)
    }
}

/// Resolve the configuration for the run-mode named in `env`, reading
/// dotenv files from the working directory.
pub fn make_config(env: &EnvSnapshot) -> Result<DbConnectionConfig> {
    ConfigFactory::default().make_config(env.run_mode().as_ref(), env)
}
