//! Indicator normalisation.
//! Min-max scaling computed independently inside each year partition.

use hcare_common::Table;

/// Min-max normalisation within [min_val, max_val].
/// A zero-width range maps every value to 0.0.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    let range = max_val - min_val;
    if range == 0.0 {
        return 0.0; // degenerate case
    }
    (value - min_val) / range
}

/// Min-max normalise one column. Missing values are skipped when finding the
/// range and stay missing.
pub fn normalise_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        // no present values
        return values.to_vec();
    }
    values
        .iter()
        .map(|v| v.map(|x| minmax_normalise(x, min, max)))
        .collect()
}

/// Normalise `indicators` of a single partition in place.
pub fn normalise_partition(table: &mut Table, indicators: &[String]) {
    for column in indicators {
        let scaled = normalise_column(&table.column_values(column));
        for (row, value) in table.rows_mut().iter_mut().zip(scaled) {
            row.set(column, value);
        }
    }
}

/// Rescale every indicator to [0, 1] within each year.
/// Returns a new table with one row per input row, grouped by year.
pub fn normalise_by_year(table: &Table, indicators: &[String]) -> Table {
    let parts = table.partition_by_year().into_values().map(|mut part| {
        normalise_partition(&mut part, indicators);
        part
    });
    Table::concat(table, parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcare_common::Record;

    #[test]
    fn test_minmax_basic() {
        assert!((minmax_normalise(15.0, 10.0, 20.0) - 0.5).abs() < 1e-12);
        assert_eq!(minmax_normalise(10.0, 10.0, 20.0), 0.0);
        assert_eq!(minmax_normalise(20.0, 10.0, 20.0), 1.0);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let out = normalise_column(&[Some(4.0), Some(4.0), Some(4.0)]);
        assert_eq!(out, vec![Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_values_skipped() {
        let out = normalise_column(&[Some(1.0), None, Some(3.0), Some(2.0)]);
        assert_eq!(out, vec![Some(0.0), None, Some(1.0), Some(0.5)]);
        assert_eq!(normalise_column(&[None, None]), vec![None, None]);
    }

    #[test]
    fn test_bounds_per_year() {
        let mut t = Table::new(["deaths"]);
        t.push(Record::new("A", 2000).with("deaths", 100.0));
        t.push(Record::new("B", 2000).with("deaths", 200.0));
        t.push(Record::new("C", 2000).with("deaths", 175.0));
        t.push(Record::new("A", 2001).with("deaths", 5.0));
        t.push(Record::new("B", 2001).with("deaths", 9.0));

        let out = normalise_by_year(&t, &["deaths".to_string()]);
        assert_eq!(out.len(), t.len());
        for (_, part) in out.partition_by_year() {
            let vals: Vec<f64> = part.column_values("deaths").into_iter().flatten().collect();
            let min = vals.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(min, 0.0);
            assert_eq!(max, 1.0);
        }
        let c = out.rows().iter().find(|r| r.location == "C").unwrap();
        assert!((c.value("deaths").unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_non_indicator_columns_untouched() {
        let mut t = Table::new(["deaths", "population"]);
        t.push(Record::new("A", 2000).with("deaths", 1.0).with("population", 10.0));
        t.push(Record::new("B", 2000).with("deaths", 3.0).with("population", 20.0));
        let out = normalise_by_year(&t, &["deaths".to_string()]);
        assert_eq!(out.column_values("population"), vec![Some(10.0), Some(20.0)]);
    }
}
