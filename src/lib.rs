//! presite - Static site builder with lazy hierarchical data resolution
//!
//! presite is the build-orchestration layer of a static-site generation
//! tool. For each project it discovers renderable input files, renders each
//! through a templating engine, and writes the resulting output tree to
//! disk.
//!
//! # Architecture Overview
//!
//! A project is addressed by its root path and laid out as three
//! directories:
//!
//! - `input/` — source tree containing renderable templates and other files
//! - `data/` — hierarchical data tree of directories and `<name>.json` leaves
//! - `output/` — fully regenerated on every build
//!
//! Two components carry the interesting logic:
//!
//! - [`resolver`] — the lazy data resolver. Templates traverse the `data/`
//!   tree path segment by path segment; each segment is resolved against
//!   the filesystem only when taken, and missing data collapses to a
//!   sentinel value instead of an error.
//! - [`build`] — the build orchestrator. It clears the output tree, fans
//!   per-file renders out concurrently over one shared resolver, flattens
//!   the variable-length output chains, and writes every entry to disk.
//!
//! # Core Modules
//!
//! - [`build`] - Build orchestration: clear, discover, render, flatten, write
//! - [`resolver`] - Lazy path-addressed access to the project data tree
//! - [`project`] - Project layout, input discovery, and file descriptors
//! - [`templating`] - Renderer trait and the built-in Tera renderer
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and user-facing error formatting
//! - [`utils`] - File system helpers (atomic writes, output clearing)
//!
//! # Example
//!
//! ```rust,no_run
//! use presite::build::BuildOrchestrator;
//! use presite::templating::TeraRenderer;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let orchestrator = BuildOrchestrator::new("./site", Arc::new(TeraRenderer::new()));
//! let report = orchestrator.build().await?;
//! println!("wrote {} file(s)", report.entries_written);
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod cli;
pub mod constants;
pub mod core;
pub mod project;
pub mod resolver;
pub mod templating;
pub mod utils;
