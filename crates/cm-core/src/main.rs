//! Course Manager configuration bootstrap CLI.
//!
//! Resolves the database configuration the server would start with and
//! reports it as JSON on stdout:
//! - `check` validates the configuration for the current run-mode
//! - `options` prints the ORM connection options
//! - `snapshot` prints a secret-free configuration snapshot
//! - `mode` prints the run-mode and where its values come from

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cm_config::{
    ConfigError, ConfigFactory, ConfigServiceFactory, ConfigSnapshot, ConfigSource,
    DropSchemaPolicy, EnvSnapshot, Logger, RunMode, RUN_MODE_VAR,
};
use cm_core::exit_codes::ExitCode;
use cm_core::logging::{init_logging, LogConfig, LogFormat, LogLevel, LoggingService};
use serde::Serialize;

/// Logger context for configuration loading.
const CONFIG_CONTEXT: &str = "ConfigModule";

/// Course Manager configuration bootstrap
#[derive(Parser)]
#[command(name = "cm-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Run-mode: development, test or production [default: $NODE_ENV]
    #[arg(long, global = true)]
    mode: Option<String>,

    /// Directory holding the <mode>.env files
    #[arg(long, global = true, env = "CM_ENV_DIR", default_value = ".")]
    env_dir: PathBuf,

    /// Never drop the schema, even in development and test
    #[arg(long, global = true)]
    keep_schema: bool,

    /// Log output format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and validate configuration for the run-mode
    Check,

    /// Print ORM connection options
    Options(OptionsArgs),

    /// Print a configuration snapshot
    Snapshot,

    /// Print the run-mode and its configuration source
    Mode,
}

#[derive(Args, Debug)]
struct OptionsArgs {
    /// Options for running migrations by hand (no drop, no auto-run)
    #[arg(long)]
    for_migrations: bool,

    /// Print the password instead of masking it
    #[arg(long)]
    reveal_password: bool,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => std::process::exit(output_args_error(err).as_i32()),
    };

    let mut env = EnvSnapshot::capture();
    if let Some(mode) = &cli.global.mode {
        env = env.with_var(RUN_MODE_VAR, mode.clone());
    }

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::resolve(&env, cli_level, cli.global.log_format));

    let policy = if cli.global.keep_schema {
        DropSchemaPolicy::Never
    } else {
        DropSchemaPolicy::NonProduction
    };
    let factory = ConfigFactory::new(&cli.global.env_dir).with_drop_schema_policy(policy);

    let exit_code = match &cli.command {
        Commands::Check => run_check(&factory, &env),
        Commands::Options(args) => run_options(&factory, &env, args),
        Commands::Snapshot => run_snapshot(&factory, &env),
        Commands::Mode => run_mode(&factory, &env),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_check(factory: &ConfigFactory, env: &EnvSnapshot) -> ExitCode {
    let logger = Arc::new(LoggingService::new(CONFIG_CONTEXT));

    match ConfigServiceFactory::load_sync_with(factory, env, logger.clone()) {
        Ok(service) => {
            let options = service.connection_options().redacted();
            logger.info(&format!(
                "configuration valid for {} ({}@{}:{}/{})",
                service.mode(),
                options.username,
                options.host,
                options.port,
                options.database
            ));

            print_json(&serde_json::json!({
                "status": "ok",
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "mode": service.mode(),
                "drop_schema": options.drop_schema,
                "options": options,
            }))
        }
        Err(err) => output_config_error(&err),
    }
}

fn run_options(factory: &ConfigFactory, env: &EnvSnapshot, args: &OptionsArgs) -> ExitCode {
    let config = match ConfigServiceFactory::load_db_config_with(factory, env) {
        Ok(config) => config,
        Err(err) => return output_config_error(&err),
    };

    let mut options = config.db;
    if args.for_migrations {
        options = options.for_migration_driver();
    }
    if !args.reveal_password {
        options = options.redacted();
    }

    print_json(&options)
}

fn run_snapshot(factory: &ConfigFactory, env: &EnvSnapshot) -> ExitCode {
    match take_snapshot(factory, env) {
        Ok(snapshot) => {
            tracing::debug!(
                target: "config.snapshot",
                hash = %snapshot.options_hash,
                "configuration snapshot taken"
            );
            print_json(&snapshot)
        }
        Err(err) => output_config_error(&err),
    }
}

fn take_snapshot(factory: &ConfigFactory, env: &EnvSnapshot) -> cm_config::Result<ConfigSnapshot> {
    let mode = env
        .run_mode()
        .ok_or(ConfigError::UnrecognizedEnvironment { mode: None })?;
    let config = factory.make_config(Some(&mode), env)?;
    ConfigSnapshot::capture(&mode, &config)
}

fn run_mode(factory: &ConfigFactory, env: &EnvSnapshot) -> ExitCode {
    let mode = match env.run_mode() {
        Some(mode) => mode,
        None => return output_config_error(&ConfigError::UnrecognizedEnvironment { mode: None }),
    };
    let source = match factory.source_for(&mode, env) {
        Ok(source) => source,
        Err(err) => return output_config_error(&err),
    };

    print_json(&serde_json::json!({
        "mode": mode,
        "is_development": mode == RunMode::Development,
        "is_test": mode == RunMode::Test,
        "is_production": mode == RunMode::Production,
        "source": source.describe(),
        "drop_schema": factory.drops_schema(&mode),
    }))
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(err) => {
            eprintln!("failed to serialize output: {}", err);
            ExitCode::InternalError
        }
    }
}

fn output_config_error(error: &ConfigError) -> ExitCode {
    let exit_code = ExitCode::from(error);
    let response = serde_json::json!({
        "status": "error",
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "error": {
            "code": error.code(),
            "kind": error.kind().to_string(),
            "exit_code": exit_code.code_name(),
            "field": error.field(),
            "message": error.to_string(),
        }
    });
    eprintln!(
        "{}",
        serde_json::to_string_pretty(&response).unwrap_or_default()
    );
    exit_code
}

fn output_args_error(err: clap::Error) -> ExitCode {
    use clap::error::ErrorKind;

    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        let _ = err.print();
        return ExitCode::Clean;
    }

    let response = serde_json::json!({
        "status": "error",
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "error": {
            "exit_code": ExitCode::ArgsError.code_name(),
            "message": err.to_string().trim_end(),
        }
    });
    eprintln!(
        "{}",
        serde_json::to_string_pretty(&response).unwrap_or_default()
    );
    ExitCode::ArgsError
}
