//! Comma-separated HYG rows.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use sky_core::{SkyError, SkyResult};
use tracing::warn;

use super::{SourceBatch, StarSource};
use crate::row::{is_header, parse_record, record_line, row_reader};

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Memory { label: String, contents: String },
}

/// A catalog stored as text rows, either on disk or already in memory
/// (for example a resource bundled with the host application).
#[derive(Debug, Clone)]
pub struct TextCatalog {
    origin: Origin,
}

impl TextCatalog {
    /// A catalog file read lazily on [`StarSource::read_records`].
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            origin: Origin::File(path.as_ref().to_path_buf()),
        }
    }

    /// A catalog held in a string; `label` names it in logs.
    pub fn from_string(label: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            origin: Origin::Memory {
                label: label.into(),
                contents: contents.into(),
            },
        }
    }
}

impl StarSource for TextCatalog {
    fn name(&self) -> String {
        match &self.origin {
            Origin::File(path) => path.display().to_string(),
            Origin::Memory { label, .. } => label.clone(),
        }
    }

    fn read_records(&self) -> SkyResult<SourceBatch> {
        match &self.origin {
            Origin::File(path) => {
                let file = File::open(path)
                    .map_err(|e| SkyError::catalog_unavailable(self.name(), e.to_string()))?;
                read_rows(file, &self.name())
            }
            Origin::Memory { label, contents } => read_rows(contents.as_bytes(), label),
        }
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}

/// Decodes CSV rows from any reader.
///
/// A header line is accepted only as the first non-blank line. Rejected rows
/// are logged at warn level and collected; reading continues.
///
/// # Errors
/// Returns [`SkyError::CatalogUnavailable`] on an I/O failure mid-read.
pub fn read_rows<R: Read>(reader: R, source_name: &str) -> SkyResult<SourceBatch> {
    let mut batch = SourceBatch::default();
    let mut seen_content = false;

    for result in row_reader(reader).into_records() {
        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_io_error() => {
                return Err(SkyError::catalog_unavailable(source_name, err.to_string()));
            }
            Err(err) => {
                // undecodable text, e.g. invalid UTF-8
                let line = err.position().map_or(0, |p| p.line() as usize);
                warn!(source = source_name, line, "skipping row: {}", err);
                seen_content = true;
                batch.rows_read += 1;
                batch.reject(SkyError::malformed_row(line, err.to_string()));
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }
        let line = record_line(&record);
        if !seen_content {
            seen_content = true;
            if is_header(&record) {
                continue;
            }
        }

        batch.rows_read += 1;
        match parse_record(&record, line) {
            Ok(star) => batch.push(line, star),
            Err(err) => {
                warn!(source = source_name, line, "skipping row: {}", err);
                batch.reject(err);
            }
        }
    }

    Ok(batch)
}
