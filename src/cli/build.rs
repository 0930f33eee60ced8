//! The `presite build` command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::build::BuildOrchestrator;
use crate::templating::TeraRenderer;

/// Arguments for `presite build`.
#[derive(Args)]
pub struct BuildCommand {
    /// Path to the project root (defaults to the current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Maximum number of concurrent render/write operations
    #[arg(long, value_name = "N")]
    max_parallel: Option<usize>,
}

impl BuildCommand {
    /// Run one full build pass for the project.
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let started = Instant::now();

        let mut orchestrator =
            BuildOrchestrator::new(&self.path, Arc::new(TeraRenderer::new()));
        if let Some(max_parallel) = self.max_parallel {
            orchestrator = orchestrator.with_max_parallel(max_parallel);
        }

        let report = orchestrator.build().await?;

        if !quiet {
            println!(
                "{} rendered {} file(s), wrote {} output file(s) in {:.2}s",
                "✓".green().bold(),
                report.files_rendered,
                report.entries_written,
                started.elapsed().as_secs_f64()
            );
        }

        Ok(())
    }
}
