#![allow(dead_code)]

use assert_cmd::Command;
use convoscope_testing::fixtures;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temp dir holding a log file and an (absent) config path, so runs never
/// read the user's real configuration.
pub struct TestFixture {
    dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn log(&self, name: &str, text: &str) -> PathBuf {
        fixtures::write_log(self.dir.path(), name, text).expect("write log")
    }

    pub fn nested(&self) -> PathBuf {
        self.log("nested.jsonl", &fixtures::nested_session())
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("convoscope").expect("binary built");
        cmd.env_remove("RUST_LOG")
            .env_remove("CONVOSCOPE_CONFIG")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .args(args)
            .arg("--format")
            .arg("json")
            .output()
            .expect("run convoscope");
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
    }
}
