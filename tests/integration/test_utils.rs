//! Shared test utilities for integration tests
//!
//! A fixture owns a temporary directory and a preprocessor; files written
//! through it are registered by name.

use prologue::{Prologue, PrologueConfig, PrologueError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Fixture {
    dir: TempDir,
    pub pro: Prologue,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(PrologueConfig::default())
    }

    pub fn with_config(config: PrologueConfig) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            pro: Prologue::new(config).unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file below the fixture root without registering it
    pub fn write(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, body).unwrap();
        path
    }

    /// Write a file and register it under its file name
    pub fn file(&mut self, relative: &str, body: &str) -> PathBuf {
        let path = self.write(relative, body);
        self.pro.add_file(&path).unwrap();
        path
    }

    pub fn render(&self, name: &str) -> Vec<String> {
        self.pro.render(name).unwrap().lines
    }

    pub fn error(&self, name: &str) -> PrologueError {
        self.pro.render(name).unwrap_err()
    }
}
