// src/table.rs
use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use encoding_rs::BIG5;
use std::{borrow::Cow, fs, io, path::Path};
use tracing::{debug, info};

use crate::error::JobError;

/// Which decoding produced a [`SourceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEncoding {
    Utf8,
    Big5,
}

/// A CSV resource listing, header first, rows in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    pub encoding: TableEncoding,
    pub headers: Vec<String>,
    /// Data rows; field counts may differ from the header.
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Index of the first header cell equal to `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read `path` and decode it, UTF-8 first and Big5 as the fallback.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<SourceTable, JobError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => JobError::TableNotFound(path.to_path_buf()),
        _ => JobError::ReadTable {
            path: path.to_path_buf(),
            source,
        },
    })?;
    debug!(bytes = bytes.len(), "read source table");
    decode_table(&bytes)
}

/// Two-stage decode: UTF-8 (leading BOM stripped), then the raw bytes as Big5.
pub fn decode_table(bytes: &[u8]) -> Result<SourceTable, JobError> {
    match decode_utf8(bytes).and_then(parse_records) {
        Ok((headers, rows)) => Ok(SourceTable {
            encoding: TableEncoding::Utf8,
            headers,
            rows,
        }),
        Err(utf8_err) => {
            info!("UTF-8 parse failed ({:#}); retrying as Big5", utf8_err);
            let (headers, rows) = decode_big5(bytes)
                .and_then(parse_records)
                .map_err(|e| JobError::Undecodable(format!("{:#}", e)))?;
            Ok(SourceTable {
                encoding: TableEncoding::Big5,
                headers,
                rows,
            })
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let text = std::str::from_utf8(bytes).context("source table is not valid UTF-8")?;
    Ok(Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)))
}

fn decode_big5(bytes: &[u8]) -> Result<Cow<'_, str>> {
    BIG5.decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| anyhow!("malformed Big5 byte sequence"))
}

/// Split decoded text into a header and data rows.
fn parse_records(text: Cow<'_, str>) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(rec) => rec
            .context("CSV parse error in header")?
            .iter()
            .map(str::to_string)
            .collect(),
        None => bail!("source table has no header record"),
    };

    let mut rows = Vec::new();
    for (idx, rec) in records.enumerate() {
        let rec = rec.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        rows.push(rec.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}
