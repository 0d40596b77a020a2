use std::{io, path::PathBuf};
use thiserror::Error;

/// Failures that abort the job with a non-zero exit status.
///
/// Everything downstream of a parsed table (lookup miss, fetch failure) is
/// best-effort and never surfaces as a `JobError`.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("CSV file not found at {}", .0.display())]
    TableNotFound(PathBuf),

    #[error("reading CSV file {}: {source}", .path.display())]
    ReadTable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV parsing failed for both UTF-8 and Big5: {0}")]
    Undecodable(String),

    #[error("CSV header missing required column {0}")]
    MissingColumn(String),
}
