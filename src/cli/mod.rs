//! Command-line interface for presite.
//!
//! Each command lives in its own module with its own argument struct and
//! execution logic. Global flags control verbosity, which selects the
//! `tracing-subscriber` filter before any command runs; an explicit
//! `RUST_LOG` always wins over the flags.

mod build;

pub use build::BuildCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive. `None` disables logging entirely unless
    /// `RUST_LOG` is set in the environment.
    pub log_level: Option<String>,
}

static INIT_TRACING: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise uses the level derived from the
/// verbosity flags. Safe to call more than once; only the first call
/// installs a subscriber.
pub fn init_tracing(config: &CliConfig) {
    let log_level = config.log_level.clone();
    INIT_TRACING.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}

/// Top-level CLI for presite.
#[derive(Parser)]
#[command(
    name = "presite",
    about = "Static site builder with lazy hierarchical data resolution",
    version,
    long_about = "presite renders a project's input/ templates against its data/ tree and \
                  regenerates the output/ directory on every build."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available presite commands.
#[derive(Subcommand)]
enum Commands {
    /// Build a project: render input/ templates into output/
    Build(BuildCommand),
}

impl Cli {
    /// Derive the runtime configuration from global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig { log_level }
    }

    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        init_tracing(&config);

        let quiet = self.quiet;
        match self.command {
            Commands::Build(cmd) => cmd.execute(quiet).await,
        }
    }
}
