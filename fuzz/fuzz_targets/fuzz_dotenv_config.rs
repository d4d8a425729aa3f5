//! Fuzz target for dotenv configuration files.
//!
//! Feeds arbitrary text through the dotenv parser and the connection
//! schema. Parsing never fails and validation must return errors, never
//! panic.

#![no_main]

use cm_config::{EnvironmentMap, DB_CONNECTION_SCHEMA};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let map = EnvironmentMap::parse_dotenv(content);
    for (key, _) in map.iter() {
        assert!(!key.is_empty());
        assert!(!key.contains('='));
    }
    let _ = DB_CONNECTION_SCHEMA.validate(&map);
});
