//! IHME burden-of-disease exports.
//!
//! The exports are long format, one row per
//! (measure, location, sex, age, cause, metric, year) with the value in `val`.
//! Preparation pivots measures into columns, keeps the both-sexes rows and
//! sums over causes, leaving one row per (location, year).

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use hcare_common::{ColumnSchema, Record, Result, Table};

use crate::raw::{parse_f64, parse_year, RawFrame};

/// Columns the pivot does not use; dropped after concatenation.
pub const UNUSED_COLUMNS: [&str; 4] = ["age", "metric", "upper", "lower"];

const SEX_SPECIFIC: [&str; 2] = ["Male", "Female"];

/// One (location, sex, cause, year) row with a value per measure.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub location: String,
    pub sex: String,
    pub cause: String,
    pub year: i32,
    pub values: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotedIhme {
    /// Canonical measure names, sorted
    pub measures: Vec<String>,
    pub rows: Vec<PivotRow>,
}

type PivotKey = (String, String, String, i32);

/// Pivot long-format rows so each measure becomes a column.
///
/// Rows are keyed by (location, sex, cause, year) and come out sorted by that
/// key. The first present value wins when a key repeats a measure. Rows with a
/// missing key cell are skipped.
pub fn pivot_ihme(frame: &RawFrame, schema: &ColumnSchema) -> Result<PivotedIhme> {
    let idx = frame.require(&["measure", "location", "sex", "cause", "year", "val"])?;
    let (measure_i, location_i, sex_i, cause_i, year_i, val_i) =
        (idx[0], idx[1], idx[2], idx[3], idx[4], idx[5]);

    let mut measures = BTreeSet::new();
    let mut groups: BTreeMap<PivotKey, BTreeMap<String, Option<f64>>> = BTreeMap::new();
    let mut skipped = 0usize;

    for r in 0..frame.len() {
        let (Some(measure), Some(location), Some(sex), Some(cause), Some(year)) = (
            frame.cell(r, measure_i),
            frame.cell(r, location_i),
            frame.cell(r, sex_i),
            frame.cell(r, cause_i),
            frame.cell(r, year_i),
        ) else {
            skipped += 1;
            continue;
        };

        let measure = schema.canonical(measure);
        let key = (
            location.to_string(),
            sex.to_string(),
            cause.to_string(),
            parse_year("year", year)?,
        );
        let value = frame
            .cell(r, val_i)
            .map(|v| parse_f64("val", v))
            .transpose()?;

        let slot = groups.entry(key).or_default().entry(measure.clone()).or_insert(None);
        if slot.is_none() {
            *slot = value;
        }
        measures.insert(measure);
    }

    if skipped > 0 {
        debug!(skipped, "Skipped IHME rows with missing key cells");
    }

    let measures: Vec<String> = measures.into_iter().collect();
    let rows = groups
        .into_iter()
        .map(|((location, sex, cause, year), mut values)| {
            for m in &measures {
                values.entry(m.clone()).or_insert(None);
            }
            PivotRow { location, sex, cause, year, values }
        })
        .collect();

    Ok(PivotedIhme { measures, rows })
}

/// Keep only the both-sexes aggregate rows.
pub fn drop_sex(pivoted: PivotedIhme) -> PivotedIhme {
    let before = pivoted.rows.len();
    let rows: Vec<PivotRow> = pivoted
        .rows
        .into_iter()
        .filter(|r| !SEX_SPECIFIC.contains(&r.sex.as_str()))
        .collect();
    debug!(dropped = before - rows.len(), "Dropped sex-specific IHME rows");
    PivotedIhme {
        measures: pivoted.measures,
        rows,
    }
}

/// Sum every measure over causes, one row per (location, year).
/// Missing values count as zero, so a measure with no values sums to 0.
pub fn aggregate_over_cause(pivoted: &PivotedIhme) -> Table {
    let mut sums: BTreeMap<(String, i32), Vec<f64>> = BTreeMap::new();
    for row in &pivoted.rows {
        let acc = sums
            .entry((row.location.clone(), row.year))
            .or_insert_with(|| vec![0.0; pivoted.measures.len()]);
        for (slot, m) in acc.iter_mut().zip(&pivoted.measures) {
            *slot += row.values.get(m).copied().flatten().unwrap_or(0.0);
        }
    }

    let mut table = Table::new(pivoted.measures.iter().cloned());
    for ((location, year), totals) in sums {
        let mut record = Record::new(location, year);
        for (m, total) in pivoted.measures.iter().zip(totals) {
            record = record.with(m, total);
        }
        table.push(record);
    }

    info!(
        rows = table.len(),
        measures = pivoted.measures.len(),
        "Aggregated IHME measures over causes"
    );
    table
}
