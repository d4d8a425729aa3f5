//! CLI error handling tests for cm-core.
//!
//! These tests verify that configuration failures produce a JSON error on
//! stderr, nothing on stdout, and the documented exit code.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DOTENV: &str =
    "DB_HOST=localhost\nDB_NAME=db\nDB_PORT=5432\nDB_PASSWORD=pw\nDB_USER=u\nDB_SCHEMA=s\n";

/// Get a Command for the cm-core binary with a clean environment.
fn cm_core(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cm-core").expect("cm-core binary should exist");
    cmd.env_clear()
        .env("CM_ENV_DIR", dir.path())
        .env("CM_LOG", "off");
    cmd
}

fn stderr_json(cmd: &mut Command, expected_code: i32) -> serde_json::Value {
    let output = cmd.output().expect("run cm-core");
    assert_eq!(output.status.code(), Some(expected_code));
    assert!(output.stdout.is_empty(), "stdout should stay empty on failure");
    serde_json::from_slice(&output.stderr).expect("stderr should be JSON")
}

// ============================================================================
// Run-mode errors (exit 11)
// ============================================================================

mod environment {
    use super::*;

    #[test]
    fn unset_mode_fails() {
        let dir = TempDir::new().unwrap();
        let json = stderr_json(cm_core(&dir).arg("check"), 11);

        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["kind"], "environment");
        assert_eq!(json["error"]["exit_code"], "ERR_ENVIRONMENT");
        assert_eq!(
            json["error"]["message"],
            "environment variable NODE_ENV is not set"
        );
    }

    #[test]
    fn empty_mode_counts_as_unset() {
        let dir = TempDir::new().unwrap();
        stderr_json(cm_core(&dir).env("NODE_ENV", "").arg("options"), 11);
    }

    #[test]
    fn unknown_mode_fails() {
        let dir = TempDir::new().unwrap();
        let json = stderr_json(cm_core(&dir).args(["--mode", "staging", "check"]), 11);
        assert_eq!(
            json["error"]["message"],
            "staging is not a recognised environment"
        );
    }

    #[test]
    fn mode_command_rejects_unknown_mode() {
        let dir = TempDir::new().unwrap();
        stderr_json(cm_core(&dir).args(["--mode", "Production", "mode"]), 11);
    }
}

// ============================================================================
// Source errors (exit 12)
// ============================================================================

mod source {
    use super::*;

    #[test]
    fn missing_dotenv_file_fails() {
        let dir = TempDir::new().unwrap();
        let json = stderr_json(cm_core(&dir).args(["--mode", "development", "check"]), 12);

        assert_eq!(json["error"]["kind"], "source");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("development.env"));
    }

    #[test]
    fn non_utf8_dotenv_file_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test.env"), b"DB_HOST=ok\nDB_PASSWORD=\xff\n").unwrap();
        let json = stderr_json(cm_core(&dir).args(["--mode", "test", "snapshot"]), 12);
        assert_eq!(json["error"]["exit_code"], "ERR_SOURCE");
        assert!(json["error"]["message"].as_str().unwrap().contains("UTF-8"));
    }

    #[test]
    fn unparseable_lines_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let content = format!("this is not a pair\n# comment\n{DOTENV}");
        fs::write(dir.path().join("test.env"), content).unwrap();
        cm_core(&dir)
            .args(["--mode", "test", "check"])
            .assert()
            .success();
    }
}

// ============================================================================
// Validation errors (exit 13)
// ============================================================================

mod validation {
    use super::*;

    #[test]
    fn production_non_numeric_port_fails() {
        let dir = TempDir::new().unwrap();
        let json = stderr_json(
            cm_core(&dir)
                .env("NODE_ENV", "production")
                .env("DB_HOST", "db")
                .env("DB_NAME", "courses")
                .env("DB_PASSWORD", "secret")
                .env("DB_PORT", "notanumber")
                .env("DB_SCHEMA", "coursemanagement")
                .env("DB_USER", "svc")
                .arg("check"),
            13,
        );

        assert_eq!(json["error"]["kind"], "validation");
        assert_eq!(json["error"]["field"], "DB_PORT");
    }

    #[test]
    fn missing_key_in_dotenv_is_named() {
        let dir = TempDir::new().unwrap();
        let content = DOTENV.replace("DB_SCHEMA=s\n", "");
        fs::write(dir.path().join("development.env"), content).unwrap();

        let json = stderr_json(cm_core(&dir).args(["--mode", "development", "options"]), 13);
        assert_eq!(json["error"]["field"], "DB_SCHEMA");
    }

    #[test]
    fn failure_is_logged_with_hidden_trace_in_production() {
        let dir = TempDir::new().unwrap();
        cm_core(&dir)
            .env_remove("CM_LOG")
            .args(["--log-format", "jsonl", "--mode", "production", "check"])
            .assert()
            .code(13)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("ConfigModule::config validation error"))
            .stderr(predicate::str::contains("stack trace hidden"));
    }
}

// ============================================================================
// Argument errors (exit 10)
// ============================================================================

mod args {
    use super::*;

    #[test]
    fn unknown_command_fails() {
        let dir = TempDir::new().unwrap();
        cm_core(&dir)
            .arg("nonexistent-command")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("ERR_ARGS"));
    }

    #[test]
    fn unknown_log_format_fails() {
        let dir = TempDir::new().unwrap();
        cm_core(&dir)
            .args(["--log-format", "xml", "check"])
            .assert()
            .code(10);
    }

    #[test]
    fn help_succeeds() {
        let dir = TempDir::new().unwrap();
        cm_core(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("snapshot"));
    }
}
