//! Built-in template renderer backed by Tera.
//!
//! Renders `.liquid` input files with the Tera engine. The lazy data
//! resolver is exposed to templates through a registered `data` function
//! (`{{ data(path="site.title") }}`), built strictly on top of
//! [`LazyResolver::get`]; a `content` filter lets templates inline other
//! project files through the scoped [`ProjectIo`] capability. An optional
//! YAML frontmatter block supplies per-file [`RenderMeta`].

use anyhow::Result;
use futures::future::BoxFuture;
use gray_matter::engine::Engine;
use gray_matter::{Matter, Pod};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tera::{Context as TeraContext, Tera};
use tracing::{debug, warn};

use super::{RenderMeta, RenderedEntry, Renderer};
use crate::constants::TEMPLATE_EXTENSION;
use crate::core::PresiteError;
use crate::project::{FileDescriptor, ProjectIo};
use crate::resolver::LazyResolver;

/// gray_matter engine that returns raw frontmatter text without parsing.
///
/// Deferring YAML parsing to serde_yaml keeps malformed frontmatter from
/// failing extraction outright; the metadata just falls back to defaults.
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// The default [`Renderer`] implementation.
///
/// Stateless apart from configuration; a fresh `Tera` instance is built per
/// render (cheap — empty registries) so concurrent renders share nothing.
pub struct TeraRenderer;

impl TeraRenderer {
    /// Create the default renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Split a template into optional frontmatter metadata and its body.
    fn split_frontmatter(file: &FileDescriptor) -> (RenderMeta, String) {
        let matter: Matter<RawFrontmatter> = Matter::new();
        let parsed = match matter.parse::<String>(&file.raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("frontmatter extraction failed for {}: {e}", file.file.display());
                return (RenderMeta::default(), file.raw.clone());
            }
        };

        let meta = parsed
            .data
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match serde_yaml::from_str::<RenderMeta>(&raw) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!("unparseable frontmatter in {}: {e}", file.file.display());
                    None
                }
            })
            .unwrap_or_default();

        (meta, parsed.content)
    }

    /// Build a Tera instance with the `data` function and `content` filter
    /// bound to this render's resolver and I/O capability.
    fn build_engine(data: &Arc<LazyResolver>, io: &ProjectIo) -> Tera {
        let mut tera = Tera::default();

        let resolver = Arc::clone(data);
        tera.register_function(
            "data",
            move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                let path = args
                    .get("path")
                    .and_then(tera::Value::as_str)
                    .ok_or_else(|| tera::Error::msg("data() requires a string `path` argument"))?;
                Ok(resolver.get(path.split('.')).into_template_value())
            },
        );

        let io = io.clone();
        tera.register_filter(
            "content",
            move |value: &tera::Value,
                  _args: &HashMap<String, tera::Value>|
                  -> tera::Result<tera::Value> {
                let relative = value
                    .as_str()
                    .ok_or_else(|| tera::Error::msg("content filter expects a path string"))?;
                io.read_file_sync(Path::new(relative))
                    .map(tera::Value::String)
                    .map_err(|e| tera::Error::msg(format!("{e:#}")))
            },
        );

        tera
    }
}

impl Default for TeraRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TeraRenderer {
    fn is_renderable(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION)
    }

    fn render<'a>(
        &'a self,
        file: &'a FileDescriptor,
        data: &'a Arc<LazyResolver>,
        io: &'a ProjectIo,
    ) -> BoxFuture<'a, Result<Vec<RenderedEntry>>> {
        Box::pin(async move {
            debug!("rendering {}", file.file.display());

            let (meta, body) = Self::split_frontmatter(file);
            let mut tera = Self::build_engine(data, io);

            let mut context = TeraContext::new();
            context.insert("page", &serde_json::json!({ "file": file.file }));

            let content = tera.render_str(&body, &context).map_err(|e| {
                PresiteError::RenderError {
                    file: file.file.display().to_string(),
                    reason: format_tera_error(&e),
                }
            })?;

            Ok(vec![RenderedEntry { meta, content }])
        })
    }
}

/// Flatten a Tera error chain into one readable line, stripping the
/// internal `__tera_one_off` template name.
fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = Vec::new();
    let mut all_messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        all_messages.push(err.to_string());
        current = err.source();
    }

    for msg in all_messages {
        let cleaned = msg
            .replace("Failed to render '__tera_one_off'", "Template rendering failed")
            .replace("Failed to parse '__tera_one_off'", "Template syntax error")
            .replace("'__tera_one_off'", "template")
            .trim()
            .to_string();
        if !cleaned.is_empty()
            && cleaned != "Template rendering failed"
            && cleaned != "Template syntax error"
        {
            messages.push(cleaned);
        }
    }

    if messages.is_empty() {
        "Template syntax error".to_string()
    } else {
        messages.join(": ")
    }
}
