//! Final join of disease burden and workforce on (location, year).

use std::collections::HashMap;

use tracing::info;

use hcare_common::{Record, Table};

/// Inner join on (location, year).
///
/// Output columns are the burden columns followed by the workforce columns;
/// labels come from the workforce side. Rows follow the burden table's order,
/// and a burden row matching several workforce rows yields one row per match.
pub fn merge_sources(burden: &Table, workforce: &Table) -> Table {
    let mut by_key: HashMap<(&str, i32), Vec<&Record>> = HashMap::new();
    for row in workforce.rows() {
        by_key
            .entry((row.location.as_str(), row.year))
            .or_default()
            .push(row);
    }

    let columns = burden
        .columns()
        .iter()
        .chain(workforce.columns().iter().filter(|c| !burden.columns().contains(c)))
        .cloned();
    let mut merged = Table::new(columns).with_labels(workforce.label_columns().iter().cloned());

    for left in burden.rows() {
        let Some(matches) = by_key.get(&(left.location.as_str(), left.year)) else {
            continue;
        };
        for right in matches {
            let mut record = left.clone();
            for column in workforce.columns() {
                record.values.entry(column.clone()).or_insert(right.value(column));
            }
            record.labels.extend(right.labels.clone());
            merged.push(record);
        }
    }

    info!(
        burden_rows = burden.len(),
        workforce_rows = workforce.len(),
        merged_rows = merged.len(),
        "Joined burden and workforce tables"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcare_common::schema::columns;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inner_join_on_location_and_year() {
        let mut burden = Table::new([columns::DEATHS]);
        burden.push(Record::new("Chile", 2000).with(columns::DEATHS, 10.0));
        burden.push(Record::new("Chile", 2001).with(columns::DEATHS, 11.0));
        burden.push(Record::new("Atlantis", 2000).with(columns::DEATHS, 1.0));

        let mut workforce = Table::new([columns::MEDICAL_DOCTORS]).with_labels([columns::REGION]);
        workforce.push(
            Record::new("Chile", 2000)
                .with(columns::MEDICAL_DOCTORS, 25.0)
                .with_label(columns::REGION, "Americas"),
        );
        workforce.push(Record::new("Peru", 2000).with(columns::MEDICAL_DOCTORS, 9.0));

        let merged = merge_sources(&burden, &workforce);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.column_names(),
            vec!["location", "year", "region", "deaths", "medical_doctors_per_10000"]
        );
        let row = &merged.rows()[0];
        assert_eq!(row.value(columns::DEATHS), Some(10.0));
        assert_eq!(row.value(columns::MEDICAL_DOCTORS), Some(25.0));
        assert_eq!(row.label(columns::REGION), Some("Americas"));
    }
}
