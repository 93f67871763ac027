//! Polarity adjustment for bad-when-high indicators.

use hcare_common::Table;

/// Invert a normalised value: 0 (worst raw) becomes 1.
pub fn invert(normalised: f64) -> f64 {
    1.0 - normalised
}

/// Replace each `negative` indicator value `v` with `1 - v` so every
/// indicator reads "higher is better".
///
/// Inputs must already be normalised to [0, 1]; on raw values the result has
/// no meaning. Missing values stay missing; other columns pass through.
pub fn adjust_negative_indicators(table: &Table, negative: &[String]) -> Table {
    let mut adjusted = table.clone();
    for row in adjusted.rows_mut() {
        for column in negative {
            let value = row.value(column).map(invert);
            row.set(column, value);
        }
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcare_common::Record;

    #[test]
    fn test_invert() {
        assert_eq!(invert(0.0), 1.0);
        assert_eq!(invert(1.0), 0.0);
        assert!((invert(0.25) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_only_negative_columns_inverted() {
        let mut t = Table::new(["deaths", "dentists"]);
        t.push(Record::new("A", 2000).with("deaths", 0.2).with("dentists", 0.2));
        t.push(Record::new("B", 2000).with_missing("deaths").with("dentists", 0.9));

        let out = adjust_negative_indicators(&t, &["deaths".to_string()]);
        assert!((out.rows()[0].value("deaths").unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(out.rows()[0].value("dentists"), Some(0.2));
        assert_eq!(out.rows()[1].value("deaths"), None);
        assert_eq!(out.rows()[1].value("dentists"), Some(0.9));
        // input untouched
        assert_eq!(t.rows()[0].value("deaths"), Some(0.2));
    }
}
