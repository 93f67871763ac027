//! Indicator weight vector.
//!
//! Weights come from the absolute loadings of the first principal component
//! of a year's adjusted indicators, so indicators that spread countries apart
//! that year count for more. Degenerate partitions fall back to uniform weights.

use serde::{Deserialize, Serialize};
use tracing::debug;

use hcare_common::Table;

use crate::pca::{first_principal_component, ZERO_VARIANCE_EPS};

/// Why uniform weights were used instead of PCA loadings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Fewer than two complete rows in the partition
    TooFewRows,
    /// No variance left after adjustment (or all-zero loadings)
    ZeroVariance,
}

/// Where a weight vector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum WeightSource {
    Pca,
    Uniform(FallbackReason),
}

/// One non-negative weight per indicator, in indicator order.
/// Weights sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub indicators: Vec<String>,
    pub weights: Vec<f64>,
    pub source: WeightSource,
}

impl WeightVector {
    /// `1 / n` for each of the `n` indicators.
    pub fn uniform(indicators: &[String], reason: FallbackReason) -> Self {
        let n = indicators.len().max(1) as f64;
        Self {
            indicators: indicators.to_vec(),
            weights: vec![1.0 / n; indicators.len()],
            source: WeightSource::Uniform(reason),
        }
    }

    /// Validate that all weights are non-negative and sum to ~1.0
    pub fn validate(&self) -> bool {
        let sum: f64 = self.weights.iter().sum();
        self.weights.len() == self.indicators.len()
            && self.weights.iter().all(|w| *w >= 0.0)
            && (sum - 1.0).abs() < 1e-9
    }

    /// Renormalise weights so they sum to 1.0. Returns false, leaving the
    /// weights unchanged, if the sum is not positive.
    pub fn normalise(&mut self) -> bool {
        let sum: f64 = self.weights.iter().sum();
        if sum > 0.0 && sum.is_finite() {
            self.weights.iter_mut().for_each(|w| *w /= sum);
            true
        } else {
            false
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub fn get(&self, indicator: &str) -> Option<f64> {
        self.indicators
            .iter()
            .position(|c| c == indicator)
            .map(|i| self.weights[i])
    }

    pub fn is_uniform_fallback(&self) -> bool {
        matches!(self.source, WeightSource::Uniform(_))
    }
}

/// Weights from a matrix of complete rows (one value per indicator).
pub fn weights_from_matrix(rows: &[Vec<f64>], indicators: &[String]) -> WeightVector {
    if rows.len() < 2 {
        return WeightVector::uniform(indicators, FallbackReason::TooFewRows);
    }

    let pc = match first_principal_component(rows) {
        Some(pc) if pc.explained_variance > ZERO_VARIANCE_EPS => pc,
        _ => return WeightVector::uniform(indicators, FallbackReason::ZeroVariance),
    };

    let mut weights = WeightVector {
        indicators: indicators.to_vec(),
        weights: pc.loadings.iter().map(|l| l.abs()).collect(),
        source: WeightSource::Pca,
    };
    if !weights.normalise() {
        return WeightVector::uniform(indicators, FallbackReason::ZeroVariance);
    }
    weights
}

/// Estimate weights for one year partition of adjusted indicators.
/// Rows with a missing indicator are left out of the estimate.
pub fn estimate_weights(partition: &Table, indicators: &[String]) -> WeightVector {
    let rows: Vec<Vec<f64>> = partition
        .rows()
        .iter()
        .filter_map(|r| r.values_for(indicators).into_iter().collect::<Option<Vec<f64>>>())
        .collect();

    let weights = weights_from_matrix(&rows, indicators);
    if let WeightSource::Uniform(reason) = weights.source {
        debug!(
            complete_rows = rows.len(),
            reason = ?reason,
            "Using uniform indicator weights"
        );
    }
    weights
}
