//! presite CLI entry point.
//!
//! Parses command-line arguments, runs the selected command, and renders
//! any failure as a user-friendly error before exiting non-zero.

use anyhow::Result;
use clap::Parser;
use presite::cli::Cli;
use presite::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
