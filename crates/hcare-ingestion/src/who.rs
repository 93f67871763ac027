//! WHO health-workforce exports.
//!
//! One file per profession, each with `ParentLocation, Location, Period, Value`.
//! The files are inner-joined on (region, location, year) and every `Value`
//! column takes its indicator's canonical name.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use hcare_common::schema::columns;
use hcare_common::{HcareError, Record, Result, Table};

use crate::raw::{parse_f64, parse_year, RawFrame};

pub const REGION_COLUMN: &str = "ParentLocation";
pub const LOCATION_COLUMN: &str = "Location";
pub const YEAR_COLUMN: &str = "Period";
pub const VALUE_COLUMN: &str = "Value";

/// One profession's export and the indicator its `Value` column becomes.
#[derive(Debug, Clone, Copy)]
pub struct WorkforceSource<'a> {
    pub indicator: &'a str,
    pub frame: &'a RawFrame,
}

type WorkforceKey = (String, String, i32);

/// Keyed values of one export, plus key order of first appearance.
fn keyed_values(frame: &RawFrame) -> Result<(Vec<WorkforceKey>, BTreeMap<WorkforceKey, Option<f64>>)> {
    let idx = frame.require(&[REGION_COLUMN, LOCATION_COLUMN, YEAR_COLUMN, VALUE_COLUMN])?;
    let mut order = Vec::new();
    let mut values = BTreeMap::new();

    for r in 0..frame.len() {
        let (Some(location), Some(year)) = (frame.cell(r, idx[1]), frame.cell(r, idx[2])) else {
            continue;
        };
        let key = (
            frame.cell(r, idx[0]).unwrap_or_default().to_string(),
            location.to_string(),
            parse_year(YEAR_COLUMN, year)?,
        );
        let value = frame
            .cell(r, idx[3])
            .map(|v| parse_f64(VALUE_COLUMN, v))
            .transpose()?;
        if !values.contains_key(&key) {
            order.push(key.clone());
            values.insert(key, value);
        }
    }
    Ok((order, values))
}

/// Inner-join the workforce exports on (region, location, year).
///
/// Row order follows the first source. A key repeated within one export
/// keeps its first row.
pub fn make_workforce_data(sources: &[WorkforceSource<'_>]) -> Result<Table> {
    let Some((first, rest)) = sources.split_first() else {
        return Err(HcareError::Config("no workforce sources configured".to_string()));
    };

    let (order, first_values) = keyed_values(first.frame)?;
    let others = rest
        .iter()
        .map(|s| keyed_values(s.frame).map(|(_, v)| v))
        .collect::<Result<Vec<_>>>()?;

    let indicators: Vec<&str> = sources.iter().map(|s| s.indicator).collect();
    let mut table = Table::new(indicators.iter().copied()).with_labels([columns::REGION]);
    let mut unmatched = BTreeSet::new();

    for key in order {
        let rest_values: Option<Vec<Option<f64>>> =
            others.iter().map(|m| m.get(&key).copied()).collect();
        let Some(rest_values) = rest_values else {
            unmatched.insert(key.1.clone());
            continue;
        };

        let first_value = first_values.get(&key).copied().flatten();
        let (region, location, year) = key;
        let mut record = Record::new(location, year).with_label(columns::REGION, region);
        let values = std::iter::once(first_value).chain(rest_values);
        for (indicator, value) in indicators.iter().zip(values) {
            record.set(indicator, value);
        }
        table.push(record);
    }

    if !unmatched.is_empty() {
        debug!(locations = unmatched.len(), "Workforce rows without a match in every export");
    }
    info!(rows = table.len(), sources = sources.len(), "Merged workforce exports");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(csv: &str) -> RawFrame {
        RawFrame::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_four_way_inner_merge() {
        let doctors = frame("ParentLocation,Location,Period,Value,Note\nAmericas,Chile,2000,10,x\nAmericas,Peru,2000,8,y\nEurope,Spain,2000,40,z\n");
        let nurses = frame("ParentLocation,Location,Period,Value\nAmericas,Chile,2000,20\nAmericas,Peru,2000,16\nEurope,Spain,2000,60\n");
        let pharm = frame("ParentLocation,Location,Period,Value\nAmericas,Chile,2000,3\nEurope,Spain,2000,12\n");
        let dent = frame("ParentLocation,Location,Period,Value\nEurope,Spain,2000,7\nAmericas,Chile,2000,NA\n");

        let t = make_workforce_data(&[
            WorkforceSource { indicator: columns::MEDICAL_DOCTORS, frame: &doctors },
            WorkforceSource { indicator: columns::NURSES_MIDWIFES, frame: &nurses },
            WorkforceSource { indicator: columns::PHARMACISTS, frame: &pharm },
            WorkforceSource { indicator: columns::DENTISTS, frame: &dent },
        ])
        .unwrap();

        let locations: Vec<&str> = t.rows().iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["Chile", "Spain"]);

        let chile = &t.rows()[0];
        assert_eq!(chile.label(columns::REGION), Some("Americas"));
        assert_eq!(chile.value(columns::MEDICAL_DOCTORS), Some(10.0));
        assert_eq!(chile.value(columns::NURSES_MIDWIFES), Some(20.0));
        assert_eq!(chile.value(columns::PHARMACISTS), Some(3.0));
        assert_eq!(chile.value(columns::DENTISTS), None);

        assert_eq!(
            t.columns(),
            &[
                columns::MEDICAL_DOCTORS,
                columns::NURSES_MIDWIFES,
                columns::PHARMACISTS,
                columns::DENTISTS
            ]
        );
    }

    #[test]
    fn test_region_is_part_of_the_key() {
        let a = frame("ParentLocation,Location,Period,Value\nAfrica,Sudan,2000,1\n");
        let b = frame("ParentLocation,Location,Period,Value\nEastern Mediterranean,Sudan,2000,2\n");
        let t = make_workforce_data(&[
            WorkforceSource { indicator: "a", frame: &a },
            WorkforceSource { indicator: "b", frame: &b },
        ])
        .unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_missing_who_columns() {
        let bad = frame("Location,Period\nChile,2000\n");
        let err = make_workforce_data(&[WorkforceSource { indicator: "a", frame: &bad }]).unwrap_err();
        assert!(matches!(err, HcareError::MissingColumns(ref c) if c == &["ParentLocation", "Value"]));
        assert!(make_workforce_data(&[]).is_err());
    }
}
