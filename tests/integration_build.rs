//! Integration tests for the build orchestrator.
//!
//! A scripted mock renderer drives the orchestration properties (output
//! completeness, stale-output clearing, extension fallback, chain-order
//! preservation, fatal error propagation); the built-in Tera renderer
//! covers the end-to-end scenarios.

mod common;

use anyhow::Result;
use common::ProjectFixture;
use futures::future::BoxFuture;
use presite::build::BuildOrchestrator;
use presite::core::PresiteError;
use presite::project::{FileDescriptor, ProjectIo};
use presite::resolver::LazyResolver;
use presite::templating::{RenderMeta, RenderedEntry, Renderer, TeraRenderer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Renderer that returns pre-scripted entries per input-relative file path.
///
/// Files without a script echo their raw source as a single entry with
/// default metadata.
struct MockRenderer {
    scripted: HashMap<String, Vec<RenderedEntry>>,
}

impl MockRenderer {
    fn echo() -> Self {
        Self {
            scripted: HashMap::new(),
        }
    }

    fn with_entries(mut self, file: &str, entries: Vec<RenderedEntry>) -> Self {
        self.scripted.insert(file.to_string(), entries);
        self
    }
}

impl Renderer for MockRenderer {
    fn is_renderable(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "liquid")
    }

    fn render<'a>(
        &'a self,
        file: &'a FileDescriptor,
        _data: &'a Arc<LazyResolver>,
        _io: &'a ProjectIo,
    ) -> BoxFuture<'a, Result<Vec<RenderedEntry>>> {
        let entries = self
            .scripted
            .get(&file.file.display().to_string())
            .cloned()
            .unwrap_or_else(|| {
                vec![RenderedEntry {
                    meta: RenderMeta::default(),
                    content: file.raw.clone(),
                }]
            });
        Box::pin(async move { Ok(entries) })
    }
}

/// Renderer that fails on every file.
struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn is_renderable(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "liquid")
    }

    fn render<'a>(
        &'a self,
        file: &'a FileDescriptor,
        _data: &'a Arc<LazyResolver>,
        _io: &'a ProjectIo,
    ) -> BoxFuture<'a, Result<Vec<RenderedEntry>>> {
        let file = file.file.display().to_string();
        Box::pin(async move {
            Err(PresiteError::RenderError {
                file,
                reason: "scripted failure".to_string(),
            }
            .into())
        })
    }
}

fn entry(output: Option<&str>, content: &str) -> RenderedEntry {
    RenderedEntry {
        meta: RenderMeta {
            output: output.map(str::to_string),
        },
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_output_completeness_and_stale_clearing() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_input_file("index.liquid", "home")?
        .with_input_file("about/team.liquid", "team")?
        .with_stale_output("leftover.html", "from a previous build")?;

    let report = BuildOrchestrator::new(fixture.root(), Arc::new(MockRenderer::echo()))
        .build()
        .await?;

    assert_eq!(report.files_rendered, 2);
    assert_eq!(report.entries_written, 2);
    assert_eq!(fixture.output_file("index.html").as_deref(), Some("home"));
    assert_eq!(fixture.output_file("about/team.html").as_deref(), Some("team"));
    assert!(fixture.output_file("leftover.html").is_none());
    assert_eq!(
        fixture.output_files(),
        vec![PathBuf::from("about/team.html"), PathBuf::from("index.html")]
    );
    Ok(())
}

#[tokio::test]
async fn test_non_renderable_files_are_skipped() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_input_file("index.liquid", "page")?
        .with_input_file("styles.css", "body {}")?;

    let report = BuildOrchestrator::new(fixture.root(), Arc::new(MockRenderer::echo()))
        .build()
        .await?;

    assert_eq!(report.files_rendered, 1);
    assert_eq!(fixture.output_files(), vec![PathBuf::from("index.html")]);
    Ok(())
}

#[tokio::test]
async fn test_explicit_output_metadata_wins_over_fallback() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file("feed.liquid", "ignored")?;

    let renderer = MockRenderer::echo()
        .with_entries("feed.liquid", vec![entry(Some("feeds/atom.xml"), "<feed/>")]);
    BuildOrchestrator::new(fixture.root(), Arc::new(renderer))
        .build()
        .await?;

    assert_eq!(fixture.output_file("feeds/atom.xml").as_deref(), Some("<feed/>"));
    assert!(fixture.output_file("feed.html").is_none());
    Ok(())
}

#[tokio::test]
async fn test_chain_order_preserved_through_flatten() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file("posts.liquid", "ignored")?;

    // One input file yielding a multi-entry chain, e.g. a paginated render
    let renderer = MockRenderer::echo().with_entries(
        "posts.liquid",
        vec![
            entry(Some("posts/1.html"), "A"),
            entry(Some("posts/2.html"), "B"),
            entry(Some("posts/3.html"), "C"),
        ],
    );
    let report = BuildOrchestrator::new(fixture.root(), Arc::new(renderer))
        .build()
        .await?;

    assert_eq!(report.files_rendered, 1);
    assert_eq!(report.entries_written, 3);
    assert_eq!(fixture.output_file("posts/1.html").as_deref(), Some("A"));
    assert_eq!(fixture.output_file("posts/2.html").as_deref(), Some("B"));
    assert_eq!(fixture.output_file("posts/3.html").as_deref(), Some("C"));
    Ok(())
}

#[tokio::test]
async fn test_multi_target_same_stem_entries_write_concurrently() -> Result<()> {
    // A multi-target render emitting two outputs that share a stem but
    // differ in extension; their concurrent writes must not interfere.
    for _round in 0..20 {
        let fixture = ProjectFixture::new()?.with_input_file("index.liquid", "ignored")?;

        let renderer = MockRenderer::echo().with_entries(
            "index.liquid",
            vec![
                entry(Some("index.html"), "<html/>"),
                entry(Some("index.xml"), "<xml/>"),
            ],
        );
        let report = BuildOrchestrator::new(fixture.root(), Arc::new(renderer))
            .build()
            .await?;

        assert_eq!(report.entries_written, 2);
        assert_eq!(fixture.output_file("index.html").as_deref(), Some("<html/>"));
        assert_eq!(fixture.output_file("index.xml").as_deref(), Some("<xml/>"));
    }
    Ok(())
}

#[tokio::test]
async fn test_escaping_output_metadata_is_rejected() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file("sneaky.liquid", "ignored")?;

    let renderer = MockRenderer::echo()
        .with_entries("sneaky.liquid", vec![entry(Some("../../evil.html"), "owned")]);
    let result = BuildOrchestrator::new(fixture.root(), Arc::new(renderer))
        .build()
        .await;

    let err = result.expect_err("escaping output path must fail the pass");
    assert!(matches!(
        err.downcast_ref::<PresiteError>(),
        Some(PresiteError::PathEscapesProject { .. })
    ));
    assert!(!fixture.root().parent().unwrap().join("evil.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_absolute_output_metadata_is_rejected() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file("sneaky.liquid", "ignored")?;

    let renderer = MockRenderer::echo()
        .with_entries("sneaky.liquid", vec![entry(Some("/tmp/evil.html"), "owned")]);
    let result = BuildOrchestrator::new(fixture.root(), Arc::new(renderer))
        .build()
        .await;

    assert!(matches!(
        result.expect_err("absolute output path must fail the pass").downcast_ref::<PresiteError>(),
        Some(PresiteError::PathEscapesProject { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_empty_chain_writes_nothing() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file("draft.liquid", "ignored")?;

    let renderer = MockRenderer::echo().with_entries("draft.liquid", vec![]);
    let report = BuildOrchestrator::new(fixture.root(), Arc::new(renderer))
        .build()
        .await?;

    assert_eq!(report.files_rendered, 1);
    assert_eq!(report.entries_written, 0);
    assert!(fixture.output_files().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_render_failure_is_fatal_to_the_pass() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file("index.liquid", "page")?;

    let result = BuildOrchestrator::new(fixture.root(), Arc::new(FailingRenderer))
        .build()
        .await;

    let err = result.expect_err("render failure must abort the build");
    assert!(matches!(
        err.downcast_ref::<PresiteError>(),
        Some(PresiteError::RenderError { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_missing_project_root_fails() {
    let result = BuildOrchestrator::new("/definitely/not/a/project", Arc::new(MockRenderer::echo()))
        .build()
        .await;

    let err = result.expect_err("missing project root must fail");
    assert!(matches!(
        err.downcast_ref::<PresiteError>(),
        Some(PresiteError::ProjectNotFound { .. })
    ));
}

#[tokio::test]
async fn test_missing_input_dir_fails() -> Result<()> {
    let temp = tempfile::TempDir::new()?;

    let result = BuildOrchestrator::new(temp.path(), Arc::new(MockRenderer::echo()))
        .build()
        .await;

    let err = result.expect_err("missing input dir must fail");
    assert!(matches!(
        err.downcast_ref::<PresiteError>(),
        Some(PresiteError::InputDirMissing { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_max_parallel_one_still_completes() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_input_file("a.liquid", "a")?
        .with_input_file("b.liquid", "b")?
        .with_input_file("c.liquid", "c")?;

    let report = BuildOrchestrator::new(fixture.root(), Arc::new(MockRenderer::echo()))
        .with_max_parallel(1)
        .build()
        .await?;

    assert_eq!(report.files_rendered, 3);
    assert_eq!(fixture.output_files().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_tera_scenario() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_data_file("site.json", r#"{"title":"Hi"}"#)?
        .with_input_file("index.liquid", r#"<h1>{{ data(path="site.title") }}</h1>"#)?;

    BuildOrchestrator::new(fixture.root(), Arc::new(TeraRenderer::new()))
        .build()
        .await?;

    assert_eq!(fixture.output_file("index.html").as_deref(), Some("<h1>Hi</h1>"));
    Ok(())
}

#[tokio::test]
async fn test_tera_missing_data_renders_sentinel() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_input_file("index.liquid", r#"{{ data(path="site.subtitle") }}"#)?;

    BuildOrchestrator::new(fixture.root(), Arc::new(TeraRenderer::new()))
        .build()
        .await?;

    assert_eq!(fixture.output_file("index.html").as_deref(), Some("[missing]"));
    Ok(())
}

#[tokio::test]
async fn test_tera_frontmatter_output_path() -> Result<()> {
    let fixture = ProjectFixture::new()?.with_input_file(
        "redirects.liquid",
        "---\noutput: _redirects\n---\n/old /new 301",
    )?;

    BuildOrchestrator::new(fixture.root(), Arc::new(TeraRenderer::new()))
        .build()
        .await?;

    assert_eq!(fixture.output_file("_redirects").map(|c| c.trim().to_string()).as_deref(), Some("/old /new 301"));
    assert!(fixture.output_file("redirects.html").is_none());
    Ok(())
}

#[tokio::test]
async fn test_tera_content_filter_reads_project_files() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_input_file("snippets/header.txt", "THE HEADER")?
        .with_input_file(
            "index.liquid",
            r#"{{ "input/snippets/header.txt" | content }}"#,
        )?;

    BuildOrchestrator::new(fixture.root(), Arc::new(TeraRenderer::new()))
        .build()
        .await?;

    assert_eq!(fixture.output_file("index.html").as_deref(), Some("THE HEADER"));
    Ok(())
}

#[tokio::test]
async fn test_tera_syntax_error_is_fatal() -> Result<()> {
    let fixture =
        ProjectFixture::new()?.with_input_file("broken.liquid", "{{ unclosed")?;

    let result = BuildOrchestrator::new(fixture.root(), Arc::new(TeraRenderer::new()))
        .build()
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_tera_nested_data_traversal() -> Result<()> {
    let fixture = ProjectFixture::new()?
        .with_data_file("authors/jane.json", r#"{"name":"Jane","links":["a","b"]}"#)?
        .with_input_file(
            "index.liquid",
            r#"{{ data(path="authors.jane.name") }}:{{ data(path="authors.jane.links.1") }}"#,
        )?;

    BuildOrchestrator::new(fixture.root(), Arc::new(TeraRenderer::new()))
        .build()
        .await?;

    assert_eq!(fixture.output_file("index.html").as_deref(), Some("Jane:b"));
    Ok(())
}
