//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

pub const TENANT: &str = "tnt_6f1c2a52-6d8e-4b57-9d0f-0c4f6a1d2e3b";
pub const OTHER_TENANT: &str = "tnt_2d4e6f80-1a3b-4c5d-8e9f-a0b1c2d3e4f5";
pub const USER: &str = "usr_0b8f3a2e-1c4d-4e5f-8a9b-7c6d5e4f3a2b";

const INHERITED_VARS: &[&str] = &[
    "CUSTODIA_CONFIG",
    "CUSTODIA_ENV",
    "CUSTODIA_BACKEND",
    "CUSTODIA_PLATFORM_ADMIN",
    "CUSTODIA_LOG_LEVEL",
    "CUSTODIA_LOG_FILE",
    "RUST_LOG",
];

/// Test context with a temporary project directory and SQLite database
pub struct TestContext {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub tenant: String,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("register.db");

        Self {
            temp_dir,
            db_path,
            tenant: TENANT.to_string(),
        }
    }

    /// Act as another tenant on the same database
    pub fn with_tenant(mut self, tenant: &str) -> Self {
        self.tenant = tenant.to_string();
        self
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("custodia").expect("Binary not found");
        for var in INHERITED_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.path())
            .env("CUSTODIA_DB_PATH", &self.db_path)
            .env("CUSTODIA_TENANT_ID", &self.tenant)
            .env("CUSTODIA_USER_ID", USER)
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run with `--format json` and return the parsed envelope
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .arg("--format")
            .arg("json")
            .args(args)
            .output()
            .expect("Failed to run command");
        json::parse_output(&output.stdout)
    }

    /// Register an activity and return its id
    pub fn create_activity(&self, name: &str, extra: &[&str]) -> String {
        let mut args = vec![
            "activity",
            "create",
            "--name",
            name,
            "--description",
            "Tratamento de dados de teste",
        ];
        if !extra.iter().any(|a| *a == "--purpose") {
            args.extend(["--purpose", "payroll"]);
        }
        args.extend_from_slice(extra);

        let value = self.json(&args);
        json::assert_success(&value);
        value["data"]["id"]
            .as_str()
            .expect("create returns an id")
            .to_string()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert helpers for CLI output
pub trait OutputAssertions {
    fn assert_success(&self);
    fn assert_stdout_contains(&self, text: &str);
    fn assert_stderr_contains(&self, text: &str);
    fn assert_exit_code(&self, code: i32);
}

impl OutputAssertions for Output {
    fn assert_success(&self) {
        assert!(
            self.status.success(),
            "Command failed with status: {}\nstderr: {}",
            self.status,
            String::from_utf8_lossy(&self.stderr)
        );
    }

    fn assert_stdout_contains(&self, text: &str) {
        let stdout = String::from_utf8_lossy(&self.stdout);
        assert!(
            stdout.contains(text),
            "stdout did not contain '{}'\nstdout: {}",
            text,
            stdout
        );
    }

    fn assert_stderr_contains(&self, text: &str) {
        let stderr = String::from_utf8_lossy(&self.stderr);
        assert!(
            stderr.contains(text),
            "stderr did not contain '{}'\nstderr: {}",
            text,
            stderr
        );
    }

    fn assert_exit_code(&self, code: i32) {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Expected exit code {}, got {:?}\nstderr: {}",
            code,
            self.status.code(),
            String::from_utf8_lossy(&self.stderr)
        );
    }
}

/// JSON output assertions
pub mod json {
    use serde_json::Value;

    pub fn parse_output(output: &[u8]) -> Value {
        serde_json::from_slice(output).expect("Failed to parse JSON output")
    }

    pub fn assert_success(json: &Value) {
        assert_eq!(
            json.get("success").and_then(|v| v.as_bool()),
            Some(true),
            "Expected success: true in JSON output: {json}"
        );
    }

    pub fn assert_error(json: &Value, code: &str) {
        assert_eq!(
            json.get("success").and_then(|v| v.as_bool()),
            Some(false),
            "Expected success: false in JSON output"
        );
        assert_eq!(
            json.get("code").and_then(|c| c.as_str()),
            Some(code),
            "Expected error code: {code}"
        );
    }
}
