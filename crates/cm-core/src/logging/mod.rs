//! Structured logging for cm-core.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for deployment pipelines
//!
//! stdout is reserved for command payloads; all log output goes to stderr.
//!
//! [`LoggingService`] adapts `tracing` to the [`cm_config::Logger`]
//! collaborator that configuration loading reports through.

pub mod config;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use layer::JsonlLayer;

use std::io::IsTerminal;

use cm_config::Logger;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Context name used when none is given.
pub const DEFAULT_CONTEXT: &str = "DEFAULT";

/// Event target for messages sent through [`LoggingService`].
pub const APP_LOG_TARGET: &str = "app.log";

/// Build the event filter: `config.directives` if they parse, otherwise
/// `config.level`.
fn build_filter(config: &LogConfig) -> EnvFilter {
    config
        .directives
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(config.level).into())
                .parse_lossy("")
        })
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. A second call
/// leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let filter = build_filter(config);

    let result = match config.format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .try_init(),
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(JsonlLayer::stderr())
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!(target: "logging.init", "subscriber already installed");
    }
}

/// [`Logger`] backed by `tracing`, tagging every event with a context name.
#[derive(Debug, Clone)]
pub struct LoggingService {
    context: String,
}

impl Default for LoggingService {
    fn default() -> Self {
        LoggingService::new(DEFAULT_CONTEXT)
    }
}

impl LoggingService {
    pub fn new(context: impl Into<String>) -> Self {
        LoggingService {
            context: context.into(),
        }
    }

    pub fn context_name(&self) -> &str {
        &self.context
    }
}

impl Logger for LoggingService {
    fn debug(&self, message: &str) {
        tracing::debug!(target: APP_LOG_TARGET, context = %self.context, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: APP_LOG_TARGET, context = %self.context, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: APP_LOG_TARGET, context = %self.context, "{}", message);
    }

    fn error(&self, message: &str, trace: &str) {
        tracing::error!(
            target: APP_LOG_TARGET,
            context = %self.context,
            stack_trace = %trace,
            "{}",
            message
        );
    }
}
