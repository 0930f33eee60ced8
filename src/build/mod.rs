//! Build orchestration.
//!
//! One build pass coordinates the whole pipeline: clear the output tree,
//! discover renderable inputs, construct a single shared [`LazyResolver`],
//! fan per-file renders out concurrently, flatten the heterogeneous output
//! chains, and write every entry to disk. Any read, render, or write failure
//! aborts the pass; there is no retry or partial-success reporting.

use anyhow::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::{RENDERED_EXTENSION, TEMPLATE_EXTENSION, default_parallelism};
use crate::core::PresiteError;
use crate::project::{FileDescriptor, ProjectIo, ProjectLayout};
use crate::resolver::LazyResolver;
use crate::templating::{RenderMeta, Renderer};
use crate::utils::fs::{atomic_write, clear_dir_contents};

/// One flattened output entry: a rendered payload plus the descriptor of
/// the input file that produced it, kept for output-path fallback.
#[derive(Debug, Clone)]
pub struct OutputEntry {
    /// Output metadata from the renderer
    pub meta: RenderMeta,
    /// Rendered payload
    pub content: String,
    /// Descriptor of the originating input file
    pub source: FileDescriptor,
}

impl OutputEntry {
    /// The output-relative destination path for this entry.
    ///
    /// An explicit `output` in the metadata wins; otherwise the source
    /// file's input-relative path is reused with the template extension
    /// replaced by the rendered one (`page.liquid` becomes `page.html`).
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        match &self.meta.output {
            Some(explicit) => PathBuf::from(explicit),
            None => {
                let mut path = self.source.file.clone();
                if path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
                    path.set_extension(RENDERED_EXTENSION);
                }
                path
            }
        }
    }
}

/// Summary of a completed build pass.
#[derive(Debug, Clone, Copy)]
pub struct BuildReport {
    /// Number of input files rendered
    pub files_rendered: usize,
    /// Number of output entries written
    pub entries_written: usize,
}

/// Coordinates one full build pass for a project.
pub struct BuildOrchestrator {
    layout: ProjectLayout,
    renderer: Arc<dyn Renderer>,
    max_parallel: usize,
}

impl BuildOrchestrator {
    /// Create an orchestrator for a project root with the given renderer.
    pub fn new(project_root: impl Into<PathBuf>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            layout: ProjectLayout::new(project_root),
            renderer,
            max_parallel: default_parallelism(),
        }
    }

    /// Cap the number of concurrent render and write operations.
    ///
    /// Zero is ignored and keeps the default.
    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        if max_parallel > 0 {
            self.max_parallel = max_parallel;
        }
        self
    }

    /// Run one build pass.
    ///
    /// The output directory is fully cleared before any render or write
    /// starts, so a successful pass leaves the output tree exactly mirroring
    /// this pass's render results. A failed pass may leave it incomplete.
    pub async fn build(&self) -> Result<BuildReport> {
        let root = self.layout.root();
        if !root.is_dir() {
            return Err(PresiteError::ProjectNotFound {
                path: root.display().to_string(),
            }
            .into());
        }

        // The clear must fully complete before fan-out, to avoid racing
        // old-output deletion against new-output writes.
        clear_dir_contents(&self.layout.output_dir()).await?;

        let inputs: Vec<PathBuf> = self
            .layout
            .discover_input_files()?
            .into_iter()
            .filter(|path| self.renderer.is_renderable(path))
            .collect();
        info!("rendering {} input file(s) from {}", inputs.len(), root.display());

        // One resolver per pass, shared read-only across all renders.
        let resolver = Arc::new(LazyResolver::new(root));
        let io = ProjectIo::new(self.layout.clone());

        let chains: Vec<Vec<OutputEntry>> = stream::iter(inputs.into_iter().map(|path| {
            let renderer = Arc::clone(&self.renderer);
            let resolver = Arc::clone(&resolver);
            let io = io.clone();
            let layout = self.layout.clone();
            async move {
                let file = FileDescriptor::load(&path, &layout).await?;
                let entries = renderer.render(&file, &resolver, &io).await?;
                debug!("{} yielded {} output entr(ies)", file.file.display(), entries.len());
                Ok::<_, anyhow::Error>(
                    entries
                        .into_iter()
                        .map(|entry| OutputEntry {
                            meta: entry.meta,
                            content: entry.content,
                            source: file.clone(),
                        })
                        .collect::<Vec<_>>(),
                )
            }
        }))
        .buffer_unordered(self.max_parallel)
        .try_collect()
        .await?;

        let files_rendered = chains.len();

        // Flatten all per-file chains into one sequence. Intra-file order is
        // preserved; cross-file order carries no guarantee.
        let entries: Vec<OutputEntry> = chains.into_iter().flatten().collect();
        let entries_written = entries.len();

        let output_dir = self.layout.output_dir();
        stream::iter(entries.into_iter().map(|entry| {
            let output_dir = output_dir.clone();
            async move {
                let relative = entry.output_path();
                confine_to_output(&relative)?;
                let destination = output_dir.join(relative);
                debug!("writing {}", destination.display());
                atomic_write(&destination, entry.content.as_bytes()).await
            }
        }))
        .buffer_unordered(self.max_parallel)
        .try_collect::<Vec<()>>()
        .await?;

        info!("build complete: {files_rendered} file(s), {entries_written} output entr(ies)");
        Ok(BuildReport {
            files_rendered,
            entries_written,
        })
    }
}

/// Reject output-relative paths that would land outside the output tree.
///
/// An explicit frontmatter `output` is renderer-supplied data, so absolute
/// paths and `..` components get the same treatment as escaping read paths
/// in [`ProjectIo`]: a hard error, since `Path::join` would silently
/// discard the output directory for an absolute path.
fn confine_to_output(relative: &Path) -> Result<()> {
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
    Ok(())
}
