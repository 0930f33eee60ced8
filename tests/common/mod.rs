//! Common test utilities and fixtures for presite integration tests.

// Allow dead code because these utilities are shared across test files and
// not every helper is used in every file
#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory with the `input/`, `data/`, `output/`
/// layout, populated through builder-style helpers.
pub struct ProjectFixture {
    temp: TempDir,
}

impl ProjectFixture {
    /// Create an empty project with the standard directory layout.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("input"))?;
        fs::create_dir_all(temp.path().join("data"))?;
        Ok(Self { temp })
    }

    /// The project root path.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write a file under `input/`, creating intermediate directories.
    pub fn with_input_file(self, relative: &str, content: &str) -> Result<Self> {
        self.write(Path::new("input").join(relative), content)?;
        Ok(self)
    }

    /// Write a file under `data/`, creating intermediate directories.
    pub fn with_data_file(self, relative: &str, content: &str) -> Result<Self> {
        self.write(Path::new("data").join(relative), content)?;
        Ok(self)
    }

    /// Create a directory under `data/`.
    pub fn with_data_dir(self, relative: &str) -> Result<Self> {
        fs::create_dir_all(self.root().join("data").join(relative))?;
        Ok(self)
    }

    /// Pre-populate `output/` with a stale file from a "previous build".
    pub fn with_stale_output(self, relative: &str, content: &str) -> Result<Self> {
        self.write(Path::new("output").join(relative), content)?;
        Ok(self)
    }

    /// Read a file under `output/`, if it exists.
    pub fn output_file(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.root().join("output").join(relative)).ok()
    }

    /// All file paths under `output/`, relative to it, sorted.
    pub fn output_files(&self) -> Vec<PathBuf> {
        let output_dir = self.root().join("output");
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&output_dir)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.path().strip_prefix(&output_dir).ok().map(Path::to_path_buf))
            .collect();
        files.sort();
        files
    }

    fn write(&self, relative: PathBuf, content: &str) -> Result<()> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
