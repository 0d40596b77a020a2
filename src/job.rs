// src/job.rs
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::{
    artifact::{remove_stale, write_artifact},
    config::Config,
    error::JobError,
    fetch::{fetch_text, FetchOptions},
    table::load_table,
};

/// How a run that got past table parsing ended. All variants exit 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The track file was fetched and written to `dest`.
    Written {
        url: String,
        dest: PathBuf,
        bytes: usize,
    },
    /// No row matched; any stale artifact was cleaned up.
    NoMatch { removed_stale: bool },
    /// A row matched but the download (or the write) failed.
    FetchFailed {
        url: String,
        error: String,
        removed_stale: bool,
    },
}

/// Run the job once: parse the table, locate the track row, then write or
/// remove the artifact. Only configuration and parse problems are errors.
pub async fn run(config: &Config) -> Result<Outcome, JobError> {
    info!("Reading CSV from: {}", config.csv_path.display());
    let table = load_table(&config.csv_path)?;
    info!(
        encoding = ?table.encoding,
        rows = table.rows.len(),
        "parsed source table"
    );

    let Some(target) = config.matcher.find_target(&table)? else {
        info!("No KML URL found in CSV.");
        let removed_stale = clean_up(&config.kml_path).await;
        return Ok(Outcome::NoMatch { removed_stale });
    };
    info!(row = target.index, "Found KML URL: {}", target.url);

    let start = Instant::now();
    match download(&target.url, &config.kml_path, &config.fetch).await {
        Ok(bytes) => {
            info!(
                bytes,
                elapsed = ?start.elapsed(),
                "✅ Downloaded KML to {}",
                config.kml_path.display()
            );
            Ok(Outcome::Written {
                url: target.url,
                dest: config.kml_path.clone(),
                bytes,
            })
        }
        Err(e) => {
            error!("❌ Error downloading KML from {}: {:#}", target.url, e);
            let removed_stale = clean_up(&config.kml_path).await;
            Ok(Outcome::FetchFailed {
                url: target.url,
                error: format!("{:#}", e),
                removed_stale,
            })
        }
    }
}

async fn download(url: &str, dest: &Path, opts: &FetchOptions) -> Result<usize> {
    let body = fetch_text(url, opts).await?;
    write_artifact(dest, &body).await
}

/// Best-effort removal of a leftover artifact; failures are only logged.
async fn clean_up(dest: &Path) -> bool {
    match remove_stale(dest).await {
        Ok(true) => {
            info!("removed stale {}", dest.display());
            true
        }
        Ok(false) => false,
        Err(e) => {
            warn!("could not remove stale artifact: {:#}", e);
            false
        }
    }
}
