//! Renderer interface and render-output types.
//!
//! The orchestrator treats the renderer as an external collaborator behind
//! the [`Renderer`] trait: it decides which files are renderable and turns
//! one [`FileDescriptor`] into zero or more [`RenderedEntry`] values. The
//! built-in Tera implementation lives in [`renderer`]; tests substitute
//! scripted mocks.

pub mod renderer;

pub use renderer::TeraRenderer;

use anyhow::Result;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::project::{FileDescriptor, ProjectIo};
use crate::resolver::LazyResolver;

/// Output metadata attached to one rendered entry.
///
/// Deserialized from a template's YAML frontmatter when present; an absent
/// or unparseable block yields the default (no explicit output path), in
/// which case the output path is derived from the source file name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderMeta {
    /// Explicit output-relative path for this entry
    #[serde(default)]
    pub output: Option<String>,
}

/// One unit of output produced by rendering an input file.
///
/// A single input may yield zero, one, or many entries (paginated or
/// multi-target renders); their order is renderer-defined and preserved
/// end-to-end into the write phase.
#[derive(Debug, Clone)]
pub struct RenderedEntry {
    /// Output metadata for this entry
    pub meta: RenderMeta,
    /// Rendered payload
    pub content: String,
}

/// A pluggable rendering engine.
///
/// Implementations receive the source descriptor, the shared read-only data
/// resolver, and a scoped file-reading capability. `render` returns a boxed
/// future so the trait stays object-safe; the orchestrator holds renderers
/// as `Arc<dyn Renderer>`.
pub trait Renderer: Send + Sync {
    /// Whether this renderer will process the given input file.
    fn is_renderable(&self, path: &Path) -> bool;

    /// Render one input file into its output chain.
    ///
    /// Any error returned here is fatal to the whole build pass.
    fn render<'a>(
        &'a self,
        file: &'a FileDescriptor,
        data: &'a Arc<LazyResolver>,
        io: &'a ProjectIo,
    ) -> BoxFuture<'a, Result<Vec<RenderedEntry>>>;
}
