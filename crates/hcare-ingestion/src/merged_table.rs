//! Reading an already-merged country-year table.
//!
//! Headers are mapped through the column schema, so the human-readable
//! spellings written by earlier tooling (`Period`, `Medical Doctors per 10,000`)
//! land on the canonical names.

use std::path::Path;

use tracing::{info, warn};

use hcare_common::{ColumnSchema, HcareError, IndicatorSet, Record, Result, Table};

use crate::raw::{import_data, parse_f64, parse_year, RawFrame};

/// Convert a merged frame into a [`Table`] holding the indicator columns and
/// the region label (when present). Rows without a location or year are skipped.
pub fn table_from_frame(frame: &RawFrame, schema: &ColumnSchema, indicators: &IndicatorSet) -> Result<Table> {
    let canonical: Vec<String> = frame.headers().iter().map(|h| schema.canonical(h)).collect();
    let find = |name: &str| canonical.iter().position(|c| c == name);

    let mut missing = Vec::new();
    let location_i = find(&schema.location);
    let year_i = find(&schema.year);
    if location_i.is_none() {
        missing.push(schema.location.clone());
    }
    if year_i.is_none() {
        missing.push(schema.year.clone());
    }
    let indicator_names = indicators.all();
    let mut indicator_i = Vec::with_capacity(indicator_names.len());
    for name in &indicator_names {
        match find(name) {
            Some(i) => indicator_i.push(i),
            None => missing.push(name.clone()),
        }
    }
    let (Some(location_i), Some(year_i), true) = (location_i, year_i, missing.is_empty()) else {
        return Err(HcareError::MissingColumns(missing));
    };
    let region_i = find(&schema.region);

    let mut table = Table::new(indicator_names.iter().cloned());
    if region_i.is_some() {
        table = table.with_labels([schema.region.clone()]);
    }

    let mut skipped = 0usize;
    for r in 0..frame.len() {
        let (Some(location), Some(year)) = (frame.cell(r, location_i), frame.cell(r, year_i)) else {
            skipped += 1;
            continue;
        };
        let mut record = Record::new(location, parse_year(&schema.year, year)?);
        for (name, &i) in indicator_names.iter().zip(&indicator_i) {
            let value = frame.cell(r, i).map(|v| parse_f64(name, v)).transpose()?;
            record.set(name, value);
        }
        if let Some(region) = region_i.and_then(|i| frame.cell(r, i)) {
            record = record.with_label(&schema.region, region);
        }
        table.push(record);
    }

    if skipped > 0 {
        warn!(skipped, "Skipped merged rows without location or year");
    }
    Ok(table)
}

/// Read a merged CSV from disk.
pub fn read_merged_table(path: &Path, schema: &ColumnSchema, indicators: &IndicatorSet) -> Result<Table> {
    let table = table_from_frame(&import_data(path)?, schema, indicators)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        years = table.years().len(),
        "Loaded merged table"
    );
    Ok(table)
}
