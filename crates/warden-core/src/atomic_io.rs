//! Crash-safe persistence for small JSON state files.
//!
//! Account balances live in one flat file, so a partial write is real money
//! lost. State is serialized to a sibling swap file, flushed to disk, and
//! renamed over the destination; readers see either the old state or the
//! new one, never a truncated mix.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

pub fn persist_json_atomic<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("state file path cannot be empty");
    }
    if path.is_dir() {
        bail!("state file path '{}' is a directory", path.display());
    }

    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("failed to create {}", parent_dir.display()))?;

    let encoded = serde_json::to_string_pretty(state).context("failed to encode state file")?;
    let swap_name = format!(
        ".{}.swap-{}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("state"),
        std::process::id()
    );
    let swap_path = parent_dir.join(swap_name);

    let mut swap_file = File::create(&swap_path)
        .with_context(|| format!("failed to create swap file {}", swap_path.display()))?;
    swap_file
        .write_all(encoded.as_bytes())
        .with_context(|| format!("failed to write swap file {}", swap_path.display()))?;
    swap_file
        .sync_all()
        .with_context(|| format!("failed to flush swap file {}", swap_path.display()))?;
    drop(swap_file);

    std::fs::rename(&swap_path, path).with_context(|| {
        format!(
            "failed to move swap file {} into place at {}",
            swap_path.display(),
            path.display()
        )
    })?;
    Ok(())
}
