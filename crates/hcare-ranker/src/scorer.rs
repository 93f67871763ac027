//! Composite score computation.
//! S(row) = Σ(w_i × n_i) over the adjusted indicators n_i.

use hcare_common::Table;

use crate::weights::WeightVector;

/// Weighted sum of one row's adjusted indicators, in weight order.
/// Any missing indicator makes the score NaN.
pub fn compute_composite_score(values: &[Option<f64>], weights: &WeightVector) -> f64 {
    values
        .iter()
        .zip(weights.as_slice())
        .map(|(v, w)| v.map_or(f64::NAN, |n| n * w))
        .sum()
}

/// Scores for every row of a partition, in row order.
pub fn score_partition(partition: &Table, weights: &WeightVector) -> Vec<f64> {
    partition
        .rows()
        .iter()
        .map(|row| compute_composite_score(&row.values_for(&weights.indicators), weights))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::{FallbackReason, WeightSource};
    use hcare_common::Record;

    fn weights(w: &[f64]) -> WeightVector {
        WeightVector {
            indicators: vec!["a".into(), "b".into(), "c".into()],
            weights: w.to_vec(),
            source: WeightSource::Pca,
        }
    }

    #[test]
    fn test_dot_product() {
        let w = weights(&[0.2, 0.3, 0.5]);
        let s = compute_composite_score(&[Some(0.1), Some(0.2), Some(0.3)], &w);
        assert!((s - (0.02 + 0.06 + 0.15)).abs() < 1e-12);
        let s = compute_composite_score(&[Some(0.4), Some(0.5), Some(0.6)], &w);
        assert!((s - (0.08 + 0.15 + 0.30)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_value_is_nan() {
        let w = weights(&[0.2, 0.3, 0.5]);
        assert!(compute_composite_score(&[Some(0.1), None, Some(0.3)], &w).is_nan());
    }

    #[test]
    fn test_score_partition_is_deterministic() {
        let mut t = Table::new(["a", "b", "c"]);
        t.push(Record::new("X", 2000).with("a", 0.1).with("b", 0.2).with("c", 0.3));
        t.push(Record::new("Y", 2000).with("a", 0.4).with("b", 0.5).with("c", 0.6));
        let w = WeightVector::uniform(&["a".into(), "b".into(), "c".into()], FallbackReason::TooFewRows);

        let first = score_partition(&t, &w);
        let second = score_partition(&t, &w);
        assert_eq!(
            first.iter().map(|s| s.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|s| s.to_bits()).collect::<Vec<_>>()
        );
        assert!((first[0] - 0.2).abs() < 1e-12);
        assert!((first[1] - 0.5).abs() < 1e-12);
    }
}
