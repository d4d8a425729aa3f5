//! Read-only configuration service.
//!
//! [`ConfigService`] is what the rest of the application sees: run-mode
//! predicates plus the connection options for the ORM bootstrap.
//! [`ConfigServiceFactory`] is the startup entry point that resolves the
//! configuration and reports failures through the injected [`Logger`].

use std::sync::{Arc, Once};

use serde::Serialize;

use crate::connection::ConnectionOptions;
use crate::env_map::EnvSnapshot;
use crate::error::{ConfigError, Result};
use crate::factory::ConfigFactory;
use crate::mode::RunMode;

/// Trace text used in production, where error chains are not logged.
pub const HIDDEN_TRACE: &str = "stack trace hidden";

/// Logging collaborator. Calls are fire-and-forget.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str, trace: &str);
}

/// Options produced for the application container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigOptions {
    pub db: ConnectionOptions,
}

/// Validated configuration plus run-mode predicates.
pub struct ConfigService {
    mode: RunMode,
    options: ConfigOptions,
    logger: Arc<dyn Logger>,
    announced: Once,
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("mode", &self.mode)
            .field("options", &self.options.db.redacted())
            .finish_non_exhaustive()
    }
}

impl ConfigService {
    pub fn new(mode: RunMode, options: ConfigOptions, logger: Arc<dyn Logger>) -> Self {
        ConfigService {
            mode,
            options,
            logger,
            announced: Once::new(),
        }
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    pub fn is_development(&self) -> bool {
        self.mode == RunMode::Development
    }

    pub fn is_production(&self) -> bool {
        self.mode == RunMode::Production
    }

    pub fn is_test(&self) -> bool {
        self.mode == RunMode::Test
    }

    /// Connection options for the ORM bootstrap.
    ///
    /// The first call logs a redacted summary at debug level.
    pub fn connection_options(&self) -> &ConnectionOptions {
        self.announced.call_once(|| {
            let summary = serde_json::to_string_pretty(&self.options.db.redacted())
                .unwrap_or_else(|err| format!("<unserializable: {}>", err));
            self.logger.debug(&format!("ORM configuration => {}", summary));
        });
        &self.options.db
    }
}

/// Startup entry points for building a [`ConfigService`].
pub struct ConfigServiceFactory;

impl ConfigServiceFactory {
    /// Resolve configuration with `factory` and wrap it in a service.
    ///
    /// Failures are logged as `ConfigModule::<error>` and returned.
    pub fn load_sync_with(
        factory: &ConfigFactory,
        env: &EnvSnapshot,
        logger: Arc<dyn Logger>,
    ) -> Result<ConfigService> {
        match resolve(factory, env) {
            Ok((mode, options)) => Ok(ConfigService::new(mode, options, logger)),
            Err(err) => {
                let trace = if env.run_mode() == Some(RunMode::Production) {
                    HIDDEN_TRACE.to_string()
                } else {
                    error_chain(&err)
                };
                logger.error(&format!("ConfigModule::{}", err), &trace);
                Err(err)
            }
        }
    }

    /// [`Self::load_sync_with`] using dotenv files from the working directory.
    pub fn load_sync(env: &EnvSnapshot, logger: Arc<dyn Logger>) -> Result<ConfigService> {
        Self::load_sync_with(&ConfigFactory::default(), env, logger)
    }

    /// Resolve the bare options without building a service.
    pub fn load_db_config_with(factory: &ConfigFactory, env: &EnvSnapshot) -> Result<ConfigOptions> {
        resolve(factory, env).map(|(_, options)| options)
    }

    /// [`Self::load_db_config_with`] using dotenv files from the working directory.
    pub fn load_db_config_sync(env: &EnvSnapshot) -> Result<ConfigOptions> {
        Self::load_db_config_with(&ConfigFactory::default(), env)
    }
}

fn resolve(factory: &ConfigFactory, env: &EnvSnapshot) -> Result<(RunMode, ConfigOptions)> {
    let mode = env
        .run_mode()
        .ok_or(ConfigError::UnrecognizedEnvironment { mode: None })?;
    let config = factory.make_config(Some(&mode), env)?;
    let options = ConfigOptions {
        db: config.connection_options()?,
    };
    Ok((mode, options))
}

/// Render an error and its causes, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        chain.push_str("\n  caused by: ");
        chain.push_str(&inner.to_string());
        cause = inner.source();
    }
    chain
}
