//! In-memory star catalog with magnitude and hemisphere queries.
//!
//! [`CatalogStore`] owns every [`StarRecord`] read from a
//! [`StarSource`]. Records are immutable once loaded; a later
//! [`load`](CatalogStore::load) replaces the whole set. Queries borrow from
//! the store and never fail: an empty or unloaded store answers with an
//! empty result.

use std::collections::HashMap;
use std::fmt;

use sky_core::{Hemisphere, SkyError, SkyResult};
use tracing::{info, warn};

use crate::query::{magnitude_order, StarQuery};
use crate::record::StarRecord;
use crate::source::StarSource;

/// Outcome of one [`CatalogStore::load`] call.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Name of the source that was read.
    pub source: String,
    /// Data rows seen, excluding header and blank lines.
    pub rows_read: usize,
    /// Records now held by the store.
    pub loaded: usize,
    /// Rows skipped, one [`SkyError::MalformedRow`] each, including rows
    /// that repeat an earlier id.
    pub rejected: Vec<SkyError>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rows read, {} stars loaded, {} rows rejected",
            self.source,
            self.rows_read,
            self.loaded,
            self.rejected.len()
        )
    }
}

/// Star records from one catalog source.
#[derive(Debug, Default)]
pub struct CatalogStore {
    records: Vec<StarRecord>,
    by_id: HashMap<i64, usize>,
    source: Option<String>,
}

impl CatalogStore {
    /// An empty, unloaded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store and loads it from `source` in one step.
    pub fn open(source: &dyn StarSource) -> SkyResult<(Self, LoadReport)> {
        let mut store = Self::new();
        let report = store.load(source)?;
        Ok((store, report))
    }

    /// Replaces the contents of the store with the records of `source`.
    ///
    /// Malformed rows and rows repeating an earlier id are skipped with a
    /// warning and listed in the report. On failure the store is left empty
    /// and unloaded, so rendering carries on without stars.
    ///
    /// # Errors
    /// Returns [`SkyError::CatalogUnavailable`] if the source cannot be read.
    pub fn load(&mut self, source: &dyn StarSource) -> SkyResult<LoadReport> {
        self.clear();
        let name = source.name();
        let batch = match source.read_records() {
            Ok(batch) => batch,
            Err(err) => {
                warn!(source = %name, "catalog load failed: {}", err);
                return Err(err);
            }
        };

        let lines: Vec<usize> = (0..batch.records.len()).map(|i| batch.line_of(i)).collect();
        let mut rejected = batch.rejected;
        let mut records = Vec::with_capacity(batch.records.len());
        let mut by_id: HashMap<i64, usize> = HashMap::with_capacity(batch.records.len());
        let mut first_line = HashMap::with_capacity(batch.records.len());
        for (record, line) in batch.records.into_iter().zip(lines) {
            if let Some(first) = first_line.get(&record.id) {
                let err = SkyError::malformed_row(
                    line,
                    format!("duplicate id {} (first seen on line {})", record.id, first),
                );
                warn!(source = %name, id = record.id, line, "skipping duplicate star id");
                rejected.push(err);
                continue;
            }
            first_line.insert(record.id, line);
            by_id.insert(record.id, records.len());
            records.push(record);
        }

        self.records = records;
        self.by_id = by_id;
        self.source = Some(name.clone());

        let report = LoadReport {
            source: name,
            rows_read: batch.rows_read,
            loaded: self.records.len(),
            rejected,
        };
        info!("{}", report);
        Ok(report)
    }

    /// Drops every record and returns to the unloaded state.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_id.clear();
        self.source = None;
    }

    /// Stars with `mag < max_magnitude` and `id > 0`, optionally limited to
    /// one hemisphere, brightest first.
    pub fn query(&self, max_magnitude: f64, hemisphere: Option<Hemisphere>) -> Vec<&StarRecord> {
        self.select(&StarQuery::new(max_magnitude, hemisphere))
    }

    /// Same as [`query`](Self::query) with a prepared [`StarQuery`].
    pub fn select(&self, query: &StarQuery) -> Vec<&StarRecord> {
        let mut found: Vec<&StarRecord> = self.records.iter().filter(|s| query.matches(s)).collect();
        found.sort_by(|a, b| magnitude_order(a, b));
        found
    }

    pub fn get(&self, id: i64) -> Option<&StarRecord> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    /// Case-insensitive lookup by proper name, e.g. `"sirius"`.
    pub fn find_by_name(&self, name: &str) -> Option<&StarRecord> {
        let wanted = name.trim();
        self.records.iter().find(|s| {
            s.proper
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(wanted))
        })
    }

    /// All records in source order.
    pub fn records(&self) -> &[StarRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `true` once a load has succeeded, even if it produced no records.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Name of the source of the current records.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
