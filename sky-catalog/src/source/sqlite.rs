//! HYG catalog stored in an SQLite `stars` table.
//!
//! The table carries the 37 catalog columns in row order (the variable-star
//! type column is named `var_type`). Columns are read by index and decoded by
//! their storage class, so tables imported from raw CSV text (every column
//! `TEXT`) decode the same way as the text source: empty strings are absent,
//! unparseable optional numbers are dropped and a row without a usable id is
//! rejected.
//!
//! sqlx is async; each call drives it on a private current-thread runtime so
//! the catalog API stays synchronous.

use std::future::Future;
use std::path::{Path, PathBuf};

use sky_core::{Hemisphere, SkyError, SkyResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, Row, SqliteConnection, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use super::{SourceBatch, StarSource};
use crate::query::{magnitude_order, StarQuery, PLACEHOLDER_MAX_ID};
use crate::record::StarRecord;
use crate::row::{COLUMNS, FIELD_COUNT};

const TABLE: &str = "stars";

#[derive(Clone, Copy)]
enum ColumnKind {
    Int,
    Real,
    Text,
}

const TABLE_COLUMNS: [(&str, ColumnKind); FIELD_COUNT] = [
    ("id", ColumnKind::Int),
    ("hip", ColumnKind::Int),
    ("hd", ColumnKind::Int),
    ("hr", ColumnKind::Int),
    ("gl", ColumnKind::Text),
    ("bf", ColumnKind::Text),
    ("proper", ColumnKind::Text),
    ("ra", ColumnKind::Real),
    ("dec", ColumnKind::Real),
    ("dist", ColumnKind::Real),
    ("pmra", ColumnKind::Real),
    ("pmdec", ColumnKind::Real),
    ("rv", ColumnKind::Real),
    ("mag", ColumnKind::Real),
    ("absmag", ColumnKind::Real),
    ("spect", ColumnKind::Text),
    ("ci", ColumnKind::Real),
    ("x", ColumnKind::Real),
    ("y", ColumnKind::Real),
    ("z", ColumnKind::Real),
    ("vx", ColumnKind::Real),
    ("vy", ColumnKind::Real),
    ("vz", ColumnKind::Real),
    ("rarad", ColumnKind::Real),
    ("decrad", ColumnKind::Real),
    ("pmrarad", ColumnKind::Real),
    ("pmdecrad", ColumnKind::Real),
    ("bayer", ColumnKind::Text),
    ("flam", ColumnKind::Int),
    ("con", ColumnKind::Text),
    ("comp", ColumnKind::Int),
    ("comp_primary", ColumnKind::Int),
    ("base", ColumnKind::Text),
    ("lum", ColumnKind::Real),
    ("var_type", ColumnKind::Text),
    ("var_min", ColumnKind::Real),
    ("var_max", ColumnKind::Real),
];

fn select_list() -> String {
    TABLE_COLUMNS
        .iter()
        .map(|(name, _)| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table_sql() -> String {
    let columns = TABLE_COLUMNS
        .iter()
        .map(|(name, kind)| {
            let ty = match kind {
                ColumnKind::Int => "integer",
                ColumnKind::Real => "real",
                ColumnKind::Text => "text",
            };
            if *name == "id" {
                format!("\"{name}\" integer PRIMARY KEY")
            } else {
                format!("\"{name}\" {ty}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {TABLE} ({columns})")
}

fn insert_sql() -> String {
    let names = TABLE_COLUMNS
        .iter()
        .map(|(name, _)| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let params = vec!["?"; FIELD_COUNT].join(", ");
    format!("INSERT INTO {TABLE} ({names}) VALUES ({params})")
}

/// One stored value, by SQLite storage class.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
    Blob,
}

fn read_cell(row: &SqliteRow, idx: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }
    let storage = raw.type_info().name().to_string();
    Ok(match storage.as_str() {
        "INTEGER" => Cell::Int(row.try_get_unchecked(idx)?),
        "REAL" => Cell::Real(row.try_get_unchecked(idx)?),
        "TEXT" => Cell::Text(row.try_get_unchecked(idx)?),
        _ => Cell::Blob,
    })
}

fn read_cells(row: &SqliteRow) -> Result<Vec<Cell>, sqlx::Error> {
    (0..FIELD_COUNT).map(|idx| read_cell(row, idx)).collect()
}

/// A fetched row plus its 1-based position in the result set.
struct Cells {
    values: Vec<Cell>,
    number: usize,
}

impl Cells {
    fn get(&self, idx: usize) -> &Cell {
        self.values.get(idx).unwrap_or(&Cell::Null)
    }

    fn dropped(&self, idx: usize, cell: &Cell) {
        debug!(
            row = self.number,
            column = COLUMNS[idx],
            value = ?cell,
            "dropping unusable field"
        );
    }

    fn text(&self, idx: usize) -> Option<String> {
        match self.get(idx) {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Cell::Int(v) => Some(v.to_string()),
            Cell::Real(v) => Some(v.to_string()),
            _ => None,
        }
    }

    fn int(&self, idx: usize) -> Option<i64> {
        let cell = self.get(idx);
        let value = match cell {
            Cell::Null => return None,
            Cell::Text(s) if s.trim().is_empty() => return None,
            Cell::Int(v) => Some(*v),
            Cell::Real(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(*v as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        };
        if value.is_none() {
            self.dropped(idx, cell);
        }
        value
    }

    fn float(&self, idx: usize) -> Option<f64> {
        let cell = self.get(idx);
        let value = match cell {
            Cell::Null => return None,
            Cell::Text(s) if s.trim().is_empty() => return None,
            Cell::Int(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Blob => None,
        };
        if value.is_none() {
            self.dropped(idx, cell);
        }
        value
    }

    fn id(&self) -> SkyResult<i64> {
        match self.get(0) {
            Cell::Null => Err(SkyError::malformed_row(self.number, "missing id")),
            Cell::Text(s) if s.trim().is_empty() => {
                Err(SkyError::malformed_row(self.number, "missing id"))
            }
            Cell::Int(v) => Ok(*v),
            Cell::Text(s) => s.trim().parse().map_err(|_| {
                SkyError::malformed_row(self.number, format!("invalid id '{}'", s.trim()))
            }),
            other => Err(SkyError::malformed_row(
                self.number,
                format!("invalid id {:?}", other),
            )),
        }
    }

    fn decode(&self) -> SkyResult<StarRecord> {
        Ok(StarRecord {
            id: self.id()?,
            hip: self.int(1),
            hd: self.int(2),
            hr: self.int(3),
            gl: self.text(4),
            bf: self.text(5),
            proper: self.text(6),
            ra: self.float(7),
            dec: self.float(8),
            dist: self.float(9),
            pmra: self.float(10),
            pmdec: self.float(11),
            rv: self.float(12),
            mag: self.float(13),
            absmag: self.float(14),
            spect: self.text(15),
            ci: self.float(16),
            x: self.float(17),
            y: self.float(18),
            z: self.float(19),
            vx: self.float(20),
            vy: self.float(21),
            vz: self.float(22),
            rarad: self.float(23),
            decrad: self.float(24),
            pmrarad: self.float(25),
            pmdecrad: self.float(26),
            bayer: self.text(27),
            flam: self.int(28),
            con: self.text(29),
            comp: self.int(30),
            comp_primary: self.int(31),
            base: self.text(32),
            lum: self.float(33),
            var_type: self.text(34),
            var_min: self.float(35),
            var_max: self.float(36),
        })
    }
}

/// Numbers fetched rows from 1 in result order.
fn number_rows(rows: Vec<Vec<Cell>>) -> Vec<Cells> {
    rows.into_iter()
        .enumerate()
        .map(|(i, values)| Cells { values, number: i + 1 })
        .collect()
}

/// Handle to an SQLite catalog file. The file is opened per call.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, err: impl ToString) -> SkyError {
        SkyError::catalog_unavailable(self.name(), err.to_string())
    }

    fn block_on<F, T>(&self, fut: F) -> SkyResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.unavailable(e))?;
        runtime.block_on(fut).map_err(|e| self.unavailable(e))
    }

    async fn connect(&self, create: bool) -> Result<SqliteConnection, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(create)
            .read_only(!create);
        SqliteConnection::connect_with(&options).await
    }

    /// Runs the filtered, magnitude-ascending SELECT in the database.
    ///
    /// Applies the same rules as [`StarQuery::matches`]: `mag <` threshold,
    /// `id > 0`, optional hemisphere bound on `dec`. Ties are ordered by id.
    /// SQLite narrows the candidates; each decoded record is then checked
    /// with [`StarQuery::matches`], so text SQLite would coerce to `0`
    /// (for example a `mag` of `'bright'`) never counts as a magnitude.
    ///
    /// # Errors
    /// Returns [`SkyError::CatalogUnavailable`] if the database or table cannot
    /// be read.
    pub fn select(&self, query: &StarQuery) -> SkyResult<Vec<StarRecord>> {
        let mut sql = format!(
            "SELECT {} FROM {TABLE} WHERE CAST(NULLIF(mag, '') AS REAL) < ? \
             AND CAST(NULLIF(id, '') AS INTEGER) > ?",
            select_list()
        );
        if let Some(hemisphere) = query.hemisphere {
            sql.push_str(match hemisphere {
                Hemisphere::North => " AND CAST(NULLIF(\"dec\", '') AS REAL) >= 0",
                Hemisphere::South => " AND CAST(NULLIF(\"dec\", '') AS REAL) <= 0",
            });
        }

        let rows = self.block_on(async {
            let mut conn = self.connect(false).await?;
            let rows = sqlx::query(&sql)
                .bind(query.max_magnitude)
                .bind(PLACEHOLDER_MAX_ID)
                .fetch_all(&mut conn)
                .await?;
            rows.iter()
                .map(read_cells)
                .collect::<Result<Vec<_>, sqlx::Error>>()
        })?;

        let mut found: Vec<StarRecord> = number_rows(rows)
            .iter()
            .filter_map(|cells| cells.decode().ok())
            .filter(|record| query.matches(record))
            .collect();
        found.sort_by(magnitude_order);
        Ok(found)
    }

    /// Creates the `stars` table if needed and inserts `records` in one
    /// transaction. Returns the number of rows inserted.
    ///
    /// # Errors
    /// Returns [`SkyError::CatalogUnavailable`] if the database cannot be
    /// created or a row violates the table (for example a duplicate id).
    pub fn write_records<'a, I>(&self, records: I) -> SkyResult<usize>
    where
        I: IntoIterator<Item = &'a StarRecord>,
    {
        let records: Vec<&StarRecord> = records.into_iter().collect();
        let insert = insert_sql();
        let written = self.block_on(async {
            let mut conn = self.connect(true).await?;
            sqlx::query(&create_table_sql()).execute(&mut conn).await?;
            let mut tx = conn.begin().await?;
            for r in &records {
                sqlx::query(&insert)
                    .bind(r.id)
                    .bind(r.hip)
                    .bind(r.hd)
                    .bind(r.hr)
                    .bind(r.gl.as_deref())
                    .bind(r.bf.as_deref())
                    .bind(r.proper.as_deref())
                    .bind(r.ra)
                    .bind(r.dec)
                    .bind(r.dist)
                    .bind(r.pmra)
                    .bind(r.pmdec)
                    .bind(r.rv)
                    .bind(r.mag)
                    .bind(r.absmag)
                    .bind(r.spect.as_deref())
                    .bind(r.ci)
                    .bind(r.x)
                    .bind(r.y)
                    .bind(r.z)
                    .bind(r.vx)
                    .bind(r.vy)
                    .bind(r.vz)
                    .bind(r.rarad)
                    .bind(r.decrad)
                    .bind(r.pmrarad)
                    .bind(r.pmdecrad)
                    .bind(r.bayer.as_deref())
                    .bind(r.flam)
                    .bind(r.con.as_deref())
                    .bind(r.comp)
                    .bind(r.comp_primary)
                    .bind(r.base.as_deref())
                    .bind(r.lum)
                    .bind(r.var_type.as_deref())
                    .bind(r.var_min)
                    .bind(r.var_max)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            Ok::<_, sqlx::Error>(records.len())
        })?;
        info!(path = %self.path.display(), rows = written, "wrote sqlite catalog");
        Ok(written)
    }
}

impl StarSource for SqliteCatalog {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_records(&self) -> SkyResult<SourceBatch> {
        let sql = format!("SELECT {} FROM {TABLE} ORDER BY rowid ASC", select_list());
        let rows = self.block_on(async {
            let mut conn = self.connect(false).await?;
            let rows = sqlx::query(&sql).fetch_all(&mut conn).await?;
            rows.iter()
                .map(read_cells)
                .collect::<Result<Vec<_>, sqlx::Error>>()
        })?;

        let mut batch = SourceBatch::default();
        for cells in number_rows(rows) {
            batch.rows_read += 1;
            match cells.decode() {
                Ok(record) => batch.push(cells.number, record),
                Err(err) => {
                    warn!(source = %self.name(), row = cells.number, "skipping row: {}", err);
                    batch.reject(err);
                }
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn star(id: i64, mag: f64, dec: f64) -> StarRecord {
        StarRecord {
            id,
            mag: Some(mag),
            dec: Some(dec),
            rarad: Some(1.0),
            decrad: Some(dec.to_radians()),
            proper: Some(format!("star-{id}")),
            ..Default::default()
        }
    }

    fn build_db(dir: &TempDir, stars: &[StarRecord]) -> SqliteCatalog {
        let catalog = SqliteCatalog::new(dir.path().join("hyg.sqlite"));
        assert_eq!(catalog.write_records(stars).unwrap(), stars.len());
        catalog
    }

    fn exec(catalog: &SqliteCatalog, statements: &[String]) {
        catalog
            .block_on(async {
                let mut conn = catalog.connect(true).await?;
                for sql in statements {
                    sqlx::query(sql).execute(&mut conn).await?;
                }
                Ok::<_, sqlx::Error>(())
            })
            .unwrap();
    }

    /// A table as a CSV import tool leaves it: every column text.
    fn build_text_db(dir: &TempDir, rows: &[Vec<&str>]) -> SqliteCatalog {
        let catalog = SqliteCatalog::new(dir.path().join("imported.sqlite"));
        let columns = TABLE_COLUMNS
            .iter()
            .map(|(name, _)| format!("\"{name}\" text"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut statements = vec![format!("CREATE TABLE {TABLE} ({columns})")];
        for cells in rows {
            let mut values = vec!["''".to_string(); FIELD_COUNT];
            for (idx, cell) in cells.iter().enumerate() {
                values[idx] = format!("'{cell}'");
            }
            statements.push(format!("INSERT INTO {TABLE} VALUES ({})", values.join(", ")));
        }
        exec(&catalog, &statements);
        catalog
    }

    #[test]
    fn test_sql_shapes() {
        assert!(create_table_sql().contains("\"id\" integer PRIMARY KEY"));
        assert!(create_table_sql().contains("\"var_type\" text"));
        assert_eq!(insert_sql().matches('?').count(), FIELD_COUNT);
        assert!(select_list().starts_with("\"id\", \"hip\""));
    }

    #[test]
    fn test_missing_database_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let catalog = SqliteCatalog::new(dir.path().join("absent.sqlite"));
        let err = catalog.read_records().unwrap_err();
        assert!(matches!(err, SkyError::CatalogUnavailable { .. }));
    }

    #[test]
    fn test_write_then_read_all() {
        let dir = TempDir::new().unwrap();
        let stars = vec![star(0, -26.7, 0.0), star(2, 1.5, 10.0), star(1, 0.5, -20.0)];
        let catalog = build_db(&dir, &stars);

        let batch = catalog.read_records().unwrap();
        assert_eq!(batch.rows_read, 3);
        let ids: Vec<i64> = batch.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(batch.records[2], stars[1]);
    }

    #[test]
    fn test_filtered_select() {
        let dir = TempDir::new().unwrap();
        let stars = vec![
            star(0, -26.7, 0.0),
            star(1, 4.2, 12.0),
            star(2, 0.03, 38.78),
            star(3, -0.62, -52.7),
            star(4, 6.0, 45.0),
        ];
        let catalog = build_db(&dir, &stars);

        let north = catalog
            .select(&StarQuery::new(5.0, Some(Hemisphere::North)))
            .unwrap();
        let ids: Vec<i64> = north.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let all = catalog.select(&StarQuery::new(5.0, None)).unwrap();
        let ids: Vec<i64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_junk_magnitude_is_absent() {
        let dir = TempDir::new().unwrap();
        let catalog = build_db(&dir, &[star(1, 2.0, 10.0), star(2, 3.0, 20.0)]);
        exec(&catalog, &[format!("UPDATE {TABLE} SET mag = 'bright' WHERE id = 2")]);

        let found = catalog.select(&StarQuery::new(5.0, None)).unwrap();
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);

        let batch = catalog.read_records().unwrap();
        assert!(batch.rejected.is_empty());
        assert_eq!(batch.records[1].id, 2);
        assert_eq!(batch.records[1].mag, None);
        assert_eq!(batch.records[1].dec, Some(20.0));
    }

    #[test]
    fn test_imported_text_table() {
        let dir = TempDir::new().unwrap();
        let mut vega = vec![""; FIELD_COUNT];
        vega[0] = "91262";
        vega[6] = "Vega";
        vega[8] = " 38.78";
        vega[13] = "0.03";
        vega[28] = "3";
        let mut unnamed = vec![""; FIELD_COUNT];
        unnamed[13] = "1.0";
        let mut bad_id = vec![""; FIELD_COUNT];
        bad_id[0] = "x9";
        let catalog = build_text_db(&dir, &[vega, unnamed, bad_id]);

        let batch = catalog.read_records().unwrap();
        assert_eq!(batch.rows_read, 3);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.lines, vec![1]);
        let star = &batch.records[0];
        assert_eq!(star.id, 91262);
        assert_eq!(star.proper.as_deref(), Some("Vega"));
        assert_eq!(star.dec, Some(38.78));
        assert_eq!(star.mag, Some(0.03));
        assert_eq!(star.flam, Some(3));
        assert_eq!(star.hip, None);
        assert_eq!(
            batch.rejected,
            vec![
                SkyError::malformed_row(2, "missing id"),
                SkyError::malformed_row(3, "invalid id 'x9'"),
            ]
        );

        let north = catalog
            .select(&StarQuery::new(1.0, Some(Hemisphere::North)))
            .unwrap();
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].id, 91262);
    }
}
