// src/locate.rs
use tracing::debug;

use crate::{error::JobError, table::SourceTable};

/// Header of the column holding the download link.
pub const LINK_COLUMN: &str = "資料連結";
/// Header of the free-text description column.
pub const DESCRIPTION_COLUMN: &str = "說明";

/// Substrings that mark the typhoon track row. Matched case-sensitively.
pub static TRACK_KEYWORDS: &[&str] = &[
    "颱風路徑",
    "熱帶氣旋",
    "預測路徑",
    "Typhoon Track",
    "Typhoon_KML",
];

/// Which columns to read and which description substrings count as a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub link_column: String,
    pub description_column: String,
    pub keywords: Vec<String>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            link_column: LINK_COLUMN.to_string(),
            description_column: DESCRIPTION_COLUMN.to_string(),
            keywords: TRACK_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The row chosen as the track overlay source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRow {
    /// Zero-based position among the data rows (header excluded).
    pub index: usize,
    pub description: String,
    pub url: String,
}

impl Matcher {
    pub fn is_match(&self, description: &str) -> bool {
        self.keywords.iter().any(|k| description.contains(k.as_str()))
    }

    /// Resolve the two required columns, then return the first row whose
    /// description hits a keyword. Rows too short to hold both columns are
    /// skipped.
    pub fn find_target(&self, table: &SourceTable) -> Result<Option<TargetRow>, JobError> {
        let link_idx = table
            .column(&self.link_column)
            .ok_or_else(|| JobError::MissingColumn(self.link_column.clone()))?;
        let desc_idx = table
            .column(&self.description_column)
            .ok_or_else(|| JobError::MissingColumn(self.description_column.clone()))?;
        let min_len = link_idx.max(desc_idx) + 1;

        let hit = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() >= min_len)
            .find(|(_, row)| self.is_match(&row[desc_idx]))
            .map(|(index, row)| TargetRow {
                index,
                description: row[desc_idx].clone(),
                url: row[link_idx].clone(),
            });

        debug!(
            link_idx,
            desc_idx,
            rows = table.rows.len(),
            hit = ?hit.as_ref().map(|t| t.index),
            "scanned source table"
        );
        Ok(hit)
    }
}
