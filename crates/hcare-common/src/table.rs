//! In-memory country-year table.
//!
//! A [`Table`] owns its rows. Numeric columns are declared once on the table
//! and every row carries an entry for each of them (`None` = missing value).
//! Text columns other than `location` (e.g. `region`) are kept as labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cache::{Fingerprint, FingerprintBuilder};
use crate::schema::columns;

/// One location-year row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub location: String,
    pub year: i32,
    /// Numeric column -> value (None = missing)
    #[serde(default)]
    pub values: BTreeMap<String, Option<f64>>,
    /// Text column -> value
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Record {
    pub fn new(location: impl Into<String>, year: i32) -> Self {
        Self {
            location: location.into(),
            year,
            values: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Builder-style numeric value.
    pub fn with(mut self, column: &str, value: f64) -> Self {
        self.values.insert(column.to_string(), Some(value));
        self
    }

    /// Builder-style missing value.
    pub fn with_missing(mut self, column: &str) -> Self {
        self.values.insert(column.to_string(), None);
        self
    }

    /// Builder-style text label.
    pub fn with_label(mut self, column: &str, value: impl Into<String>) -> Self {
        self.labels.insert(column.to_string(), value.into());
        self
    }

    /// Value of a numeric column; None if missing or undeclared.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    pub fn set(&mut self, column: &str, value: Option<f64>) {
        self.values.insert(column.to_string(), value);
    }

    pub fn label(&self, column: &str) -> Option<&str> {
        self.labels.get(column).map(String::as_str)
    }

    /// Values for `columns`, in that order.
    pub fn values_for(&self, columns: &[String]) -> Vec<Option<f64>> {
        columns.iter().map(|c| self.value(c)).collect()
    }
}

/// Owned table of location-year records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    labels: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Empty table with the given numeric columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            labels: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Declare text label columns.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Same columns and labels, no rows.
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            labels: self.labels.clone(),
            rows: Vec::new(),
        }
    }

    /// Append a record, filling every declared column it lacks with `None`.
    pub fn push(&mut self, mut record: Record) {
        for column in &self.columns {
            record.values.entry(column.clone()).or_insert(None);
        }
        self.rows.push(record);
    }

    pub fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    /// Numeric columns in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Text label columns in declaration order.
    pub fn label_columns(&self) -> &[String] {
        &self.labels
    }

    /// Every column: identifiers, labels, then numeric columns.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![columns::LOCATION.to_string(), columns::YEAR.to_string()];
        names.extend(self.labels.iter().cloned());
        names.extend(self.columns.iter().cloned());
        names
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Record] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one numeric column, in row order.
    pub fn column_values(&self, column: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.value(column)).collect()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Split into one owned sub-table per year.
    pub fn partition_by_year(&self) -> BTreeMap<i32, Table> {
        self.clone().into_partitions()
    }

    /// Consuming variant of [`Table::partition_by_year`].
    pub fn into_partitions(self) -> BTreeMap<i32, Table> {
        let template = self.empty_like();
        let mut parts: BTreeMap<i32, Table> = BTreeMap::new();
        for record in self.rows {
            parts
                .entry(record.year)
                .or_insert_with(|| template.clone())
                .rows
                .push(record);
        }
        parts
    }

    /// Concatenate partitions back into one table shaped like `template`.
    pub fn concat<I>(template: &Table, parts: I) -> Table
    where
        I: IntoIterator<Item = Table>,
    {
        let mut out = template.empty_like();
        for part in parts {
            out.rows.extend(part.rows);
        }
        out
    }

    /// Content fingerprint over columns and every row value.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut fp = FingerprintBuilder::new();
        self.feed(&mut fp);
        fp.finish()
    }

    /// Feed the table's content into an existing fingerprint.
    pub fn feed(&self, fp: &mut FingerprintBuilder) {
        fp.update_strs(&self.columns);
        fp.update_strs(&self.labels);
        fp.update_usize(self.rows.len());
        for row in &self.rows {
            fp.update_str(&row.location);
            fp.update_i64(i64::from(row.year));
            for column in &self.columns {
                fp.update_opt_f64(row.value(column));
            }
            for label in &self.labels {
                fp.update_str(row.label(label).unwrap_or_default());
            }
        }
    }
}
