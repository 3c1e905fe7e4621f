//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use loom_test_utils::{temp_dir, write_file, StoreFixture};
use tempfile::TempDir;

/// A project directory plus an isolated global configuration directory.
pub struct TestContext {
    pub project: TempDir,
    pub global: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            project: temp_dir(),
            global: temp_dir(),
        }
    }

    /// Get path to the project directory
    pub fn path(&self) -> &Path {
        self.project.path()
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("loom").expect("Binary not found");
        cmd.current_dir(self.path())
            .env("LOOM_GLOBAL_DIR", self.global.path())
            .env_remove("LOOM_PROJECT_DIR")
            .env_remove("LOOM_LOG_LEVEL")
            .env_remove("LOOM_LOG_FILE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Register `store` in the global configuration.
    pub fn register(&self, store: &StoreFixture) {
        self.command()
            .args(["config", "add"])
            .arg(store.path())
            .args(["--name", store.name()])
            .assert()
            .success();
    }

    pub fn file(&self, rel: &str, content: &str) {
        write_file(self.path(), rel, content);
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).expect("Failed to read project file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }

    pub fn manifest(&self) -> String {
        self.read("loom.yaml")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
