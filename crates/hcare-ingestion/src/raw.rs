//! Raw delimited-file import.
//!
//! A [`RawFrame`] is the untyped view of one CSV export: headers plus string
//! cells, with the missing-value markers already turned into `None`.
//! Typed parsing happens in the source-specific modules.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use hcare_common::{ColumnSchema, HcareError, Result};

/// Cell spellings read as missing.
pub const MISSING_MARKERS: [&str; 4] = ["NA", "null", "", "NaN"];

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawFrame {
    /// Build a frame; short rows are padded with `None`, long rows truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Parse CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
                    .collect(),
            );
        }
        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, comparing cleaned headers (trimmed, unquoted,
    /// case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = ColumnSchema::clean_header(name);
        self.headers
            .iter()
            .position(|h| ColumnSchema::clean_header(h) == wanted)
    }

    /// Indices of `names`, or a schema error naming every absent column.
    pub fn require(&self, names: &[&str]) -> Result<Vec<usize>> {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name) {
                Some(i) => found.push(i),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(HcareError::MissingColumns(missing))
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Drop columns that have no present value.
    pub fn drop_empty_columns(self) -> Self {
        let keep: Vec<bool> = (0..self.headers.len())
            .map(|c| self.rows.iter().any(|r| r[c].is_some()))
            .collect();
        self.retain_columns(&keep)
    }

    /// Drop the named columns; names that are not present are ignored.
    pub fn drop_columns(self, names: &[&str]) -> Self {
        let cleaned: Vec<String> = names.iter().map(|n| ColumnSchema::clean_header(n)).collect();
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !cleaned.contains(&ColumnSchema::clean_header(h)))
            .collect();
        self.retain_columns(&keep)
    }

    fn retain_columns(self, keep: &[bool]) -> Self {
        let pick = |items: Vec<Option<String>>| -> Vec<Option<String>> {
            items
                .into_iter()
                .zip(keep)
                .filter_map(|(v, k)| k.then_some(v))
                .collect()
        };
        let headers = self
            .headers
            .into_iter()
            .zip(keep)
            .filter_map(|(h, k)| k.then_some(h))
            .collect();
        let rows = self.rows.into_iter().map(pick).collect();
        Self { headers, rows }
    }

    /// Stack frames row-wise, aligning columns by header. The result has the
    /// union of headers in first-seen order; absent cells are `None`.
    pub fn concat<I: IntoIterator<Item = RawFrame>>(frames: I) -> Self {
        let frames: Vec<RawFrame> = frames.into_iter().collect();
        let mut headers: Vec<String> = Vec::new();
        for frame in &frames {
            for h in &frame.headers {
                if !headers.contains(h) {
                    headers.push(h.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(frames.iter().map(RawFrame::len).sum());
        for frame in frames {
            let positions: Vec<usize> = frame
                .headers
                .iter()
                .filter_map(|h| headers.iter().position(|x| x == h))
                .collect();
            for row in frame.rows {
                let mut out = vec![None; headers.len()];
                for (cell, &pos) in row.into_iter().zip(&positions) {
                    out[pos] = cell;
                }
                rows.push(out);
            }
        }
        Self { headers, rows }
    }
}

/// Parse a numeric cell.
pub fn parse_f64(column: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| HcareError::Parse {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Parse a year cell. Accepts `2001` and whole-number floats like `2001.0`.
pub fn parse_year(column: &str, value: &str) -> Result<i32> {
    let trimmed = value.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Ok(year);
    }
    match trimmed.parse::<f64>() {
        Ok(y) if y.fract() == 0.0 && y.abs() < f64::from(i32::MAX) => Ok(y as i32),
        _ => Err(HcareError::Parse {
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Read a CSV file: missing markers become `None`, all-empty columns are dropped.
pub fn import_data(path: &Path) -> Result<RawFrame> {
    let file = File::open(path)?;
    let frame = RawFrame::from_reader(file)?.drop_empty_columns();
    debug!(
        path = %path.display(),
        rows = frame.len(),
        columns = frame.headers().len(),
        "Imported source file"
    );
    Ok(frame)
}
