//! Fuzz target for connection validation.
//!
//! Builds a live-environment source from arbitrary values and checks that
//! a successful validation always yields a complete connection target.

#![no_main]

use arbitrary::Arbitrary;
use cm_config::{
    DbConnectionConfig, EnvSnapshot, LiveEnvironmentConfig, DB_HOST, DB_NAME, DB_PASSWORD,
    DB_PORT, DB_SCHEMA, DB_USER,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct ConnectionVars {
    host: Option<String>,
    database: Option<String>,
    password: Option<String>,
    port: Option<String>,
    schema: Option<String>,
    user: Option<String>,
}

fuzz_target!(|vars: ConnectionVars| {
    let mut env = EnvSnapshot::default();
    for (key, value) in [
        (DB_HOST, vars.host),
        (DB_NAME, vars.database),
        (DB_PASSWORD, vars.password),
        (DB_PORT, vars.port),
        (DB_SCHEMA, vars.schema),
        (DB_USER, vars.user),
    ] {
        if let Some(value) = value {
            env = env.with_var(key, value);
        }
    }

    let mut config = DbConnectionConfig::new(LiveEnvironmentConfig::new(env));
    match config.validate() {
        Ok(()) => {
            assert!(config.host().is_some_and(|h| !h.is_empty()));
            assert!(config.port().is_some_and(|p| p >= 1));
            assert!(config.connection_options().is_ok());
        }
        Err(_) => assert!(!config.is_validated()),
    }
});
