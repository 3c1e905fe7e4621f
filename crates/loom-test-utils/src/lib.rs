//! Test utilities for Loom crates.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use loom_common_config::Store;
use loom_core::{Decide, Decision, Manifest, Prompt, PromptError};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `content` to `base/rel`, creating parent directories.
pub fn write_file(base: &Path, rel: &str, content: &str) -> PathBuf {
    let path = base.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// A store directory holding threads under `<name>/_thread/`.
pub struct StoreFixture {
    name: String,
    dir: TempDir,
}

impl StoreFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: temp_dir(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The configuration entry for this store.
    pub fn store(&self) -> Store {
        Store::local(&self.name, self.dir.path().to_string_lossy())
    }

    /// Add a file to `thread`'s `_thread` directory.
    pub fn thread_file(&self, thread: &str, rel: &str, content: &str) -> &Self {
        write_file(&thread_source(self.dir.path(), thread), rel, content);
        self
    }

    /// Create an empty thread.
    pub fn empty_thread(&self, thread: &str) -> &Self {
        std::fs::create_dir_all(thread_source(self.dir.path(), thread)).expect("Failed to create thread");
        self
    }
}

fn thread_source(store: &Path, thread: &str) -> PathBuf {
    store.join(thread).join("_thread")
}

/// A project directory with helpers to seed and inspect files.
pub struct ProjectFixture {
    dir: TempDir,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self { dir: temp_dir() }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, content: &str) -> &Self {
        write_file(self.dir.path(), rel, content);
        self
    }

    /// Add a file to a thread in the project store (`.loom/<thread>/_thread`).
    pub fn project_thread_file(&self, thread: &str, rel: &str, content: &str) -> &Self {
        write_file(&thread_source(&self.dir.path().join(".loom"), thread), rel, content);
        self
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(rel)).expect("Failed to read project file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.dir.path().join(rel).exists()
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::load(self.dir.path()).expect("Failed to load loom.yaml")
    }
}

/// A [`Decide`] that answers from a fixed script and records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedDecider {
    answers: VecDeque<Decision>,
    pub prompts: Vec<Prompt>,
}

impl ScriptedDecider {
    pub fn new(answers: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// A decider that fails if it is ever asked.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Decide for ScriptedDecider {
    fn decide(&mut self, prompt: &Prompt) -> Result<Decision, PromptError> {
        self.prompts.push(prompt.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(prompt.path.clone()))
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
