//! Course Manager bootstrap support.
//!
//! Logging setup and exit codes shared by the `cm-core` binary and its
//! integration tests.

pub mod exit_codes;
pub mod logging;
