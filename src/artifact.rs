// src/artifact.rs
use anyhow::{Context, Result};
use std::{io, path::Path};
use tokio::fs;

/// Write `body` to `dest` as UTF-8, replacing whatever was there.
/// Returns the number of bytes written.
pub async fn write_artifact(dest: impl AsRef<Path>, body: &str) -> Result<usize> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(dest, body.as_bytes())
        .await
        .with_context(|| format!("writing {}", dest.display()))?;
    Ok(body.len())
}

/// Delete `dest` if present. `Ok(true)` means a file was removed.
pub async fn remove_stale(dest: impl AsRef<Path>) -> Result<bool> {
    let dest = dest.as_ref();
    match fs::remove_file(dest).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("removing {}", dest.display())),
    }
}
