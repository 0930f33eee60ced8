//! Project layout, input discovery, and file descriptors.
//!
//! A project is addressed purely by its root filesystem path and laid out as
//! `input/` (renderable sources), `data/` (the resolver's backing tree), and
//! `output/` (fully regenerated on every build). This module knows that
//! layout, recursively discovers input files, and loads them into
//! [`FileDescriptor`]s for the renderer.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::constants::{DATA_DIR, INPUT_DIR, OUTPUT_DIR};
use crate::core::PresiteError;

/// The conventional directory layout under one project root.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout view over a project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/input` — the renderable source tree.
    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.root.join(INPUT_DIR)
    }

    /// `<root>/data` — the hierarchical data tree read by the resolver.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// `<root>/output` — the rendered output tree.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// Recursively list every file under the input directory.
    ///
    /// Returns absolute paths. Filtering down to renderable files is the
    /// renderer's concern, applied by the orchestrator. Unreadable entries
    /// are skipped rather than failing discovery.
    pub fn discover_input_files(&self) -> Result<Vec<PathBuf>> {
        let input_dir = self.input_dir();
        if !input_dir.is_dir() {
            return Err(PresiteError::InputDirMissing {
                path: input_dir.display().to_string(),
            }
            .into());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&input_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if entry.file_type().is_file() {
                trace!("discovered input file {}", entry.path().display());
                files.push(entry.path().to_path_buf());
            }
        }

        debug!("discovered {} file(s) under {}", files.len(), input_dir.display());
        Ok(files)
    }
}

/// A loaded source file handed to the renderer.
///
/// Constructed fresh on every read, never cached, never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    /// Raw source text of the file
    pub raw: String,
    /// Directory containing the file
    pub path: PathBuf,
    /// Path of the file relative to the project's input root
    pub file: PathBuf,
}

impl FileDescriptor {
    /// Load a file into a descriptor.
    ///
    /// `file_path` is the absolute location on disk; the descriptor's `file`
    /// field is computed relative to the project's input directory. A file
    /// outside the input tree keeps its project-relative path so output-path
    /// fallback still produces something sensible.
    pub async fn load(file_path: &Path, layout: &ProjectLayout) -> Result<Self> {
        let raw = tokio::fs::read_to_string(file_path)
            .await
            .with_context(|| format!("Failed to read source file: {}", file_path.display()))?;

        let relative = file_path
            .strip_prefix(layout.input_dir())
            .or_else(|_| file_path.strip_prefix(layout.root()))
            .unwrap_or(file_path);

        Ok(Self {
            raw,
            path: file_path.parent().unwrap_or(Path::new("")).to_path_buf(),
            file: relative.to_path_buf(),
        })
    }
}

/// Read-only project file access handed to renderers.
///
/// Lets a renderer read *other* project files by relative path (layouts,
/// partials, includes). Each read produces a fresh [`FileDescriptor`]; the
/// capability grants no write access and rejects paths that resolve outside
/// the project root.
#[derive(Debug, Clone)]
pub struct ProjectIo {
    layout: ProjectLayout,
}

impl ProjectIo {
    /// Create the capability for one project.
    #[must_use]
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// The project root this capability is scoped to.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        self.layout.root()
    }

    /// Read a project file by project-relative path.
    pub async fn read_file(&self, relative: &Path) -> Result<FileDescriptor> {
        let checked = self.confine(relative)?;
        FileDescriptor::load(&checked, &self.layout).await
    }

    /// Synchronous variant used from inside template filters, which run on
    /// the render call stack and cannot await.
    pub fn read_file_sync(&self, relative: &Path) -> Result<String> {
        let checked = self.confine(relative)?;
        std::fs::read_to_string(&checked)
            .with_context(|| format!("Failed to read project file: {}", checked.display()))
    }

    /// Resolve a relative path under the project root, rejecting absolute
    /// paths and `..` components.
    fn confine(&self, relative: &Path) -> Result<PathBuf> {
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(PresiteError::PathEscapesProject {
                path: relative.display().to_string(),
            }
            .into());
        }
        Ok(self.layout.root().join(relative))
    }
}
