//! Logging configuration.
//!
//! Resolved in layers, later layers winning:
//! - Run-mode defaults (development logs at debug, production at info,
//!   test is silent)
//! - `CM_LOG` and `CM_LOG_FORMAT`
//! - `RUST_LOG` filter directives, replacing the level when set
//! - CLI flags (`-v`, `-q`, `--log-format`)

use clap::ValueEnum;
use cm_config::{EnvSnapshot, RunMode};
use tracing_subscriber::filter::LevelFilter;

/// Environment variable overriding the log level.
pub const LOG_LEVEL_VAR: &str = "CM_LOG";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_VAR: &str = "CM_LOG_FORMAT";

/// Environment variable holding `tracing` filter directives.
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Completely silent.
    Off,
}

impl LogLevel {
    /// Parse a level name (`trace` .. `error`, `off`) or a `tracing`
    /// verbosity number. Empty input is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            return None;
        }
        value.trim().parse::<LevelFilter>().ok().map(LogLevel::from)
    }
}

impl From<LevelFilter> for LogLevel {
    fn from(filter: LevelFilter) -> Self {
        if filter == LevelFilter::TRACE {
            LogLevel::Trace
        } else if filter == LevelFilter::DEBUG {
            LogLevel::Debug
        } else if filter == LevelFilter::INFO {
            LogLevel::Info
        } else if filter == LevelFilter::WARN {
            LogLevel::Warn
        } else if filter == LevelFilter::ERROR {
            LogLevel::Error
        } else {
            LogLevel::Off
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Minimum log level, used when `directives` is `None`.
    pub level: LogLevel,
    /// `RUST_LOG`-style filter directives.
    pub directives: Option<String>,
}

impl LogConfig {
    /// Defaults for a run-mode.
    pub fn for_mode(mode: Option<&RunMode>) -> Self {
        let level = match mode {
            Some(RunMode::Test) => LogLevel::Off,
            Some(RunMode::Development) => LogLevel::Debug,
            _ => LogLevel::Info,
        };
        LogConfig {
            level,
            ..LogConfig::default()
        }
    }

    /// Resolve every layer from `env` and the CLI flags.
    ///
    /// Unparseable `CM_LOG`/`CM_LOG_FORMAT` values are ignored. A CLI level
    /// discards `RUST_LOG` directives.
    pub fn resolve(
        env: &EnvSnapshot,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let mut config = LogConfig::for_mode(env.run_mode().as_ref());

        if let Some(level) = env.get(LOG_LEVEL_VAR).and_then(LogLevel::parse) {
            config.level = level;
        }
        if let Some(format) = env
            .get(LOG_FORMAT_VAR)
            .and_then(|v| LogFormat::from_str(v.trim(), true).ok())
        {
            config.format = format;
        }
        config.directives = env
            .get(LOG_FILTER_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string);

        if let Some(level) = cli_level {
            config.level = level;
            config.directives = None;
        }
        if let Some(format) = cli_format {
            config.format = format;
        }

        config
    }
}
