//! File system utilities for the build pipeline.
//!
//! Async helpers over `tokio::fs` with context-rich errors. Output files are
//! written atomically (temp file + rename) so a failed build never leaves a
//! half-written file behind, and the output directory is cleared with an
//! idempotent helper that tolerates a missing directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

/// Per-process sequence number for temp file names.
///
/// Concurrent writes may target outputs sharing a stem (`index.html` and
/// `index.xml` from one multi-target render), so temp names must be unique
/// per write, not derived from the destination alone.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Ensure a directory exists, creating it and all parents if necessary.
///
/// Returns an error if the path exists but is not a directory.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "Path exists but is not a directory: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Atomically write bytes to a file using a write-then-rename strategy.
///
/// Content goes to a uniquely named `.tmp` sibling first, is synced to
/// disk, then renamed over the target, so readers never see a partial file
/// and concurrent writes to same-stem destinations cannot collide. Parent
/// directories are created as needed and an existing file is overwritten.
pub async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        ensure_dir(parent).await?;
    }

    let temp_path = unique_temp_path(path, parent);

    {
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .await
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().await.context("Failed to sync file to disk")?;
    }

    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    trace!("wrote {} byte(s) to {}", content.len(), path.display());
    Ok(())
}

/// Build a temp path next to the destination, unique within this process.
///
/// Includes the full destination file name (extension and all), the process
/// id, and a sequence number, so `index.html` and `index.xml` written
/// concurrently never share a temp file.
fn unique_temp_path(path: &Path, parent: Option<&Path>) -> PathBuf {
    let file_name = path
        .file_name()
        .map_or_else(|| "output".to_string(), |n| n.to_string_lossy().into_owned());
    let temp_name = format!(
        ".{file_name}.{}-{}.tmp",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    match parent {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

/// Remove everything inside a directory, keeping the directory itself.
///
/// Idempotent: a missing directory is not an error. Used to clear the
/// output tree before a build pass starts.
pub async fn clear_dir_contents(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Ok(());
    }

    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Failed to list directory: {}", path.display()))?;

    let mut removed = 0usize;
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to read directory entry in {}", path.display()))?
    {
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("Failed to stat {}", entry_path.display()))?;

        if file_type.is_dir() {
            tokio::fs::remove_dir_all(&entry_path)
                .await
                .with_context(|| format!("Failed to remove directory: {}", entry_path.display()))?;
        } else {
            tokio::fs::remove_file(&entry_path)
                .await
                .with_context(|| format!("Failed to remove file: {}", entry_path.display()))?;
        }
        removed += 1;
    }

    debug!("cleared {removed} entries from {}", path.display());
    Ok(())
}
