// src/config.rs

use crate::{error::JobError, fetch::FetchOptions, locate::Matcher};
use std::{env, path::PathBuf};

/// Env var naming the source table to read.
pub const CSV_PATH_VAR: &str = "CSV_PATH";
/// Env var naming where the downloaded KML goes.
pub const KML_PATH_VAR: &str = "KML_PATH";

#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: PathBuf,
    pub kml_path: PathBuf,
    pub fetch: FetchOptions,
    pub matcher: Matcher,
}

impl Config {
    /// Config with the default fetch options and keyword set.
    pub fn new(csv_path: impl Into<PathBuf>, kml_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            kml_path: kml_path.into(),
            fetch: FetchOptions::default(),
            matcher: Matcher::default(),
        }
    }

    /// Read both paths from the process environment.
    pub fn from_env() -> Result<Self, JobError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but against an arbitrary lookup, so the
    /// variable handling can be exercised without mutating the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, JobError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .ok_or(JobError::MissingEnv(key))
        };
        Ok(Self::new(require(CSV_PATH_VAR)?, require(KML_PATH_VAR)?))
    }
}
