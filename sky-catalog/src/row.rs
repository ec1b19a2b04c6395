//! Text codec for the 37-column HYG row format.
//!
//! One star per record in standard CSV: fields separated by commas, quoted
//! when they contain a comma, quote or line break. Whitespace around fields
//! is trimmed and empty fields are absent values. A row must carry exactly
//! [`FIELD_COUNT`] fields; any other count makes the whole row invalid.
//! Optional numeric fields that fail to parse are dropped to `None` (logged at
//! debug level) rather than failing the row, so a single odd cell never costs
//! a star.

use std::fmt::Display;
use std::io::{self, Read, Write};

use csv::StringRecord;
use sky_core::{SkyError, SkyResult};
use tracing::debug;

use crate::record::StarRecord;

/// Number of fields in every catalog row.
pub const FIELD_COUNT: usize = 37;

/// Column names in row order, as written in the header line.
pub const COLUMNS: [&str; FIELD_COUNT] = [
    "id",
    "hip",
    "hd",
    "hr",
    "gl",
    "bf",
    "proper",
    "ra",
    "dec",
    "dist",
    "pmra",
    "pmdec",
    "rv",
    "mag",
    "absmag",
    "spect",
    "ci",
    "x",
    "y",
    "z",
    "vx",
    "vy",
    "vz",
    "rarad",
    "decrad",
    "pmrarad",
    "pmdecrad",
    "bayer",
    "flam",
    "con",
    "comp",
    "comp_primary",
    "base",
    "lum",
    "var",
    "var_min",
    "var_max",
];

/// Returns `true` for the header record that opens a HYG export.
pub fn is_header(record: &StringRecord) -> bool {
    record.get(0) == Some("id")
}

/// The header line, without a trailing newline.
pub fn header_line() -> String {
    COLUMNS.join(",")
}

/// A CSV reader configured for catalog rows: no implicit header, ragged
/// records allowed so the field count can be reported per row.
pub fn row_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn row_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// 1-based line on which `record` starts, or 0 if the reader did not track it.
pub fn record_line(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

struct Fields<'a> {
    record: &'a StringRecord,
    line: usize,
}

impl<'a> Fields<'a> {
    fn raw(&self, idx: usize) -> Option<&'a str> {
        self.record.get(idx).filter(|s| !s.is_empty())
    }

    fn text(&self, idx: usize) -> Option<String> {
        self.raw(idx).map(str::to_string)
    }

    fn int(&self, idx: usize) -> Option<i64> {
        let raw = self.raw(idx)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!(
                    line = self.line,
                    column = COLUMNS[idx],
                    value = raw,
                    "dropping non-integer field"
                );
                None
            }
        }
    }

    fn float(&self, idx: usize) -> Option<f64> {
        let raw = self.raw(idx)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!(
                    line = self.line,
                    column = COLUMNS[idx],
                    value = raw,
                    "dropping non-numeric field"
                );
                None
            }
        }
    }
}

/// Parses one catalog row given as text. `line` is the 1-based line number
/// used in errors.
///
/// # Errors
/// Returns [`SkyError::MalformedRow`] if the row is not valid CSV, does not
/// have exactly [`FIELD_COUNT`] fields, or if `id` is empty or not an integer.
pub fn parse_row(row: &str, line: usize) -> SkyResult<StarRecord> {
    let mut record = StringRecord::new();
    row_reader(row.as_bytes())
        .read_record(&mut record)
        .map_err(|e| SkyError::malformed_row(line, e.to_string()))?;
    parse_record(&record, line)
}

/// Decodes one CSV record already split into fields.
///
/// # Errors
/// Returns [`SkyError::MalformedRow`] if the record does not have exactly
/// [`FIELD_COUNT`] fields or if `id` is empty or not an integer.
pub fn parse_record(record: &StringRecord, line: usize) -> SkyResult<StarRecord> {
    if record.len() != FIELD_COUNT {
        return Err(SkyError::malformed_row(
            line,
            format!("expected {} fields, found {}", FIELD_COUNT, record.len()),
        ));
    }

    let f = Fields { record, line };
    let id_raw = f
        .raw(0)
        .ok_or_else(|| SkyError::malformed_row(line, "missing id"))?;
    let id: i64 = id_raw
        .parse()
        .map_err(|_| SkyError::malformed_row(line, format!("invalid id '{}'", id_raw)))?;

    Ok(StarRecord {
        id,
        hip: f.int(1),
        hd: f.int(2),
        hr: f.int(3),
        gl: f.text(4),
        bf: f.text(5),
        proper: f.text(6),
        ra: f.float(7),
        dec: f.float(8),
        dist: f.float(9),
        pmra: f.float(10),
        pmdec: f.float(11),
        rv: f.float(12),
        mag: f.float(13),
        absmag: f.float(14),
        spect: f.text(15),
        ci: f.float(16),
        x: f.float(17),
        y: f.float(18),
        z: f.float(19),
        vx: f.float(20),
        vy: f.float(21),
        vz: f.float(22),
        rarad: f.float(23),
        decrad: f.float(24),
        pmrarad: f.float(25),
        pmdecrad: f.float(26),
        bayer: f.text(27),
        flam: f.int(28),
        con: f.text(29),
        comp: f.int(30),
        comp_primary: f.int(31),
        base: f.text(32),
        lum: f.float(33),
        var_type: f.text(34),
        var_min: f.float(35),
        var_max: f.float(36),
    })
}

fn cell<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// The record's fields in column order. Absent fields become empty cells;
/// floats use Rust's shortest round-tripping representation, so
/// [`parse_record`] gives back the same values.
pub fn to_cells(r: &StarRecord) -> [String; FIELD_COUNT] {
    [
        r.id.to_string(),
        cell(&r.hip),
        cell(&r.hd),
        cell(&r.hr),
        cell(&r.gl),
        cell(&r.bf),
        cell(&r.proper),
        cell(&r.ra),
        cell(&r.dec),
        cell(&r.dist),
        cell(&r.pmra),
        cell(&r.pmdec),
        cell(&r.rv),
        cell(&r.mag),
        cell(&r.absmag),
        cell(&r.spect),
        cell(&r.ci),
        cell(&r.x),
        cell(&r.y),
        cell(&r.z),
        cell(&r.vx),
        cell(&r.vy),
        cell(&r.vz),
        cell(&r.rarad),
        cell(&r.decrad),
        cell(&r.pmrarad),
        cell(&r.pmdecrad),
        cell(&r.bayer),
        cell(&r.flam),
        cell(&r.con),
        cell(&r.comp),
        cell(&r.comp_primary),
        cell(&r.base),
        cell(&r.lum),
        cell(&r.var_type),
        cell(&r.var_min),
        cell(&r.var_max),
    ]
}

/// Formats a record as one catalog row, without a trailing newline. Text
/// fields are quoted where CSV requires it.
///
/// # Errors
/// Only fails if the CSV writer does, which an in-memory buffer never does.
pub fn format_row(r: &StarRecord) -> csv::Result<String> {
    let mut buf = Vec::new();
    {
        let mut writer = row_writer(&mut buf);
        writer.write_record(to_cells(r))?;
        writer.flush()?;
    }
    let mut row = String::from_utf8(buf)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    if row.ends_with('\n') {
        row.pop();
    }
    Ok(row)
}

impl StarRecord {
    /// Shorthand for [`format_row`].
    pub fn to_row(&self) -> csv::Result<String> {
        format_row(self)
    }
}

/// Writes a header line followed by one row per record.
///
/// Returns the number of rows written (header excluded).
pub fn write_rows<'a, W, I>(writer: &mut W, records: I) -> csv::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a StarRecord>,
{
    let mut out = row_writer(writer);
    out.write_record(COLUMNS)?;
    let mut count = 0;
    for record in records {
        out.write_record(to_cells(record))?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}
