//! Backends that produce [`StarRecord`]s for a [`CatalogStore`](crate::CatalogStore).
//!
//! - [`text`]: CSV rows from a file or an in-memory string
//! - [`sqlite`]: a `stars` table in an SQLite database (feature `sqlite`)

use sky_core::{SkyError, SkyResult};

use crate::record::StarRecord;

pub mod text;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use text::TextCatalog;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCatalog;

/// Everything a source read in one pass.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    /// Data rows seen, excluding header and blank lines.
    pub rows_read: usize,
    /// Rows that decoded into records, in source order.
    pub records: Vec<StarRecord>,
    /// Where each record came from, parallel to `records`: the 1-based file
    /// line for text sources, the 1-based row number for tables.
    pub lines: Vec<usize>,
    /// One [`SkyError::MalformedRow`] per rejected row.
    pub rejected: Vec<SkyError>,
}

impl SourceBatch {
    /// A batch of already decoded records numbered from 1.
    pub fn from_records(records: Vec<StarRecord>) -> Self {
        Self {
            rows_read: records.len(),
            lines: (1..=records.len()).collect(),
            records,
            rejected: Vec::new(),
        }
    }

    pub fn push(&mut self, line: usize, record: StarRecord) {
        self.lines.push(line);
        self.records.push(record);
    }

    pub fn reject(&mut self, err: SkyError) {
        self.rejected.push(err);
    }

    /// Source line of the record at `index`, falling back to its ordinal
    /// when the source did not number its rows.
    pub fn line_of(&self, index: usize) -> usize {
        self.lines.get(index).copied().unwrap_or(index + 1)
    }
}

/// A readable star catalog.
pub trait StarSource {
    /// Short label used in logs and errors, usually the file path.
    fn name(&self) -> String;

    /// Reads every row of the catalog.
    ///
    /// Per-row failures go into [`SourceBatch::rejected`]; only an unreachable
    /// backing store fails the whole read.
    ///
    /// # Errors
    /// Returns [`SkyError::CatalogUnavailable`] if the file or table cannot be
    /// opened or read.
    fn read_records(&self) -> SkyResult<SourceBatch>;
}
