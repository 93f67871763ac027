//! Ranking pipeline orchestration.
//!
//! normalise (per year) → invert negative indicators → for each year:
//! weights → composite score → rank → concatenate → sort by (year, rank).
//!
//! The caller's table is never modified; every year partition is an owned
//! copy, so partitions can be scored on the rayon pool without coordination.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hcare_common::schema::columns;
use hcare_common::{Fingerprint, FingerprintBuilder, FingerprintCache, HcareError, IndicatorSet, Record, Result, Table};

use crate::normalise::normalise_by_year;
use crate::polarity::adjust_negative_indicators;
use crate::rank::competition_rank;
use crate::scorer::score_partition;
use crate::weights::{estimate_weights, WeightVector};

/// An input record with its score and rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub composite_score: f64,
    /// 1 = best within the year
    pub rank: u32,
}

impl ScoredRecord {
    pub fn location(&self) -> &str {
        &self.record.location
    }

    pub fn year(&self) -> i32 {
        self.record.year
    }
}

/// Pipeline output: input rows (raw values) plus score and rank, sorted by
/// (year, rank, location), with the weights used for each year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTable {
    columns: Vec<String>,
    labels: Vec<String>,
    rows: Vec<ScoredRecord>,
    weights: BTreeMap<i32, WeightVector>,
}

impl ScoredTable {
    pub fn rows(&self) -> &[ScoredRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Numeric input columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn label_columns(&self) -> &[String] {
        &self.labels
    }

    /// Input column names followed by `composite_score` and `rank`.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![columns::LOCATION.to_string(), columns::YEAR.to_string()];
        names.extend(self.labels.iter().cloned());
        names.extend(self.columns.iter().cloned());
        names.push(columns::COMPOSITE_SCORE.to_string());
        names.push(columns::RANK.to_string());
        names
    }

    pub fn weights(&self) -> &BTreeMap<i32, WeightVector> {
        &self.weights
    }

    pub fn weights_for(&self, year: i32) -> Option<&WeightVector> {
        self.weights.get(&year)
    }
}

pub type ScoreCache = FingerprintCache<ScoredTable>;

struct YearResult {
    year: i32,
    weights: WeightVector,
    rows: Vec<ScoredRecord>,
}

/// Configured ranking run.
#[derive(Debug, Clone)]
pub struct RankingPipeline {
    indicators: IndicatorSet,
    parallel: bool,
}

impl RankingPipeline {
    pub fn new(indicators: IndicatorSet) -> Self {
        Self {
            indicators,
            parallel: false,
        }
    }

    /// Score year partitions on the rayon pool. Output is identical either way.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    /// Fail fast on an invalid indicator set or missing indicator columns.
    pub fn validate(&self, table: &Table) -> Result<()> {
        self.indicators.validate()?;
        self.indicators
            .require_columns(table.columns().iter().map(String::as_str))
    }

    pub fn run(&self, table: &Table) -> Result<ScoredTable> {
        self.validate(table)?;
        let indicators = self.indicators.all();

        info!(
            rows = table.len(),
            years = table.years().len(),
            indicators = indicators.len(),
            parallel = self.parallel,
            "Running ranking pipeline"
        );

        let normalised = normalise_by_year(table, &indicators);
        let adjusted = adjust_negative_indicators(&normalised, &self.indicators.negative);

        // Both sides partition in the same stable order.
        let mut raw_parts = table.partition_by_year();
        let partitions: Vec<(i32, Table, Table)> = adjusted
            .into_partitions()
            .into_iter()
            .map(|(year, adj)| {
                let raw = raw_parts.remove(&year).unwrap_or_else(|| adj.empty_like());
                (year, raw, adj)
            })
            .collect();

        let results: Vec<YearResult> = if self.parallel {
            partitions
                .into_par_iter()
                .map(|(year, raw, adj)| score_year(year, raw, &adj, &indicators))
                .collect::<Result<Vec<_>>>()?
        } else {
            partitions
                .into_iter()
                .map(|(year, raw, adj)| score_year(year, raw, &adj, &indicators))
                .collect::<Result<Vec<_>>>()?
        };

        let mut weights = BTreeMap::new();
        let mut rows = Vec::with_capacity(table.len());
        for result in results {
            weights.insert(result.year, result.weights);
            rows.extend(result.rows);
        }
        rows.sort_by(|a, b| {
            a.year()
                .cmp(&b.year())
                .then(a.rank.cmp(&b.rank))
                .then_with(|| a.location().cmp(b.location()))
        });

        info!(rows = rows.len(), "Ranking complete");

        Ok(ScoredTable {
            columns: table.columns().to_vec(),
            labels: table.label_columns().to_vec(),
            rows,
            weights,
        })
    }

    /// Cache key: table content plus indicator polarity.
    pub fn fingerprint(&self, table: &Table) -> Fingerprint {
        let mut fp = FingerprintBuilder::new();
        table.feed(&mut fp);
        fp.update_strs(&self.indicators.negative);
        fp.update_strs(&self.indicators.positive);
        fp.finish()
    }

    /// [`RankingPipeline::run`], memoised on the input fingerprint.
    pub fn run_cached(&self, table: &Table, cache: &mut ScoreCache) -> Result<Arc<ScoredTable>> {
        cache.get_or_try_insert_with(self.fingerprint(table), || self.run(table))
    }
}

/// Weights, scores and ranks for one year. `raw` and `adjusted` hold the
/// same rows in the same order.
fn score_year(year: i32, raw: Table, adjusted: &Table, indicators: &[String]) -> Result<YearResult> {
    let weights = estimate_weights(adjusted, indicators);
    let scores = score_partition(adjusted, &weights);

    if let Some((row, _)) = adjusted
        .rows()
        .iter()
        .zip(&scores)
        .find(|(_, s)| !s.is_finite())
    {
        return Err(HcareError::NonFiniteScore {
            year,
            location: row.location.clone(),
        });
    }

    let ranks = competition_rank(&scores);
    debug!(year, rows = scores.len(), source = ?weights.source, "Scored year");

    let rows = raw
        .into_rows()
        .into_iter()
        .zip(scores)
        .zip(ranks)
        .map(|((record, composite_score), rank)| ScoredRecord {
            record,
            composite_score,
            rank,
        })
        .collect();

    Ok(YearResult { year, weights, rows })
}

/// Score and rank `table` with `indicators`.
pub fn process_ranking_pipeline(table: &Table, indicators: &IndicatorSet) -> Result<ScoredTable> {
    RankingPipeline::new(indicators.clone()).run(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcare_common::Record;

    fn two_column_table() -> Table {
        let mut t = Table::new(["deaths", "doctors"]);
        t.push(Record::new("A", 2000).with("deaths", 10.0).with("doctors", 1.0));
        t.push(Record::new("B", 2000).with("deaths", 5.0).with("doctors", 3.0));
        t.push(Record::new("C", 2000).with("deaths", 7.0).with("doctors", 2.0));
        t
    }

    fn indicators() -> IndicatorSet {
        IndicatorSet::new(["deaths"], ["doctors"])
    }

    #[test]
    fn test_best_row_ranks_first() {
        let out = process_ranking_pipeline(&two_column_table(), &indicators()).unwrap();
        let order: Vec<&str> = out.rows().iter().map(|r| r.location()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(out.rows()[0].rank, 1);
        assert!(out.weights_for(2000).unwrap().validate());
    }

    #[test]
    fn test_raw_values_preserved() {
        let out = process_ranking_pipeline(&two_column_table(), &indicators()).unwrap();
        let a = out.rows().iter().find(|r| r.location() == "A").unwrap();
        assert_eq!(a.record.value("deaths"), Some(10.0));
        assert_eq!(a.record.value("doctors"), Some(1.0));
    }

    #[test]
    fn test_missing_indicator_column_is_schema_error() {
        let t = Table::new(["deaths"]);
        let err = process_ranking_pipeline(&t, &indicators()).unwrap_err();
        match err {
            HcareError::MissingColumns(cols) => assert_eq!(cols, vec!["doctors".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let mut t = two_column_table();
        t.push(Record::new("D", 2000).with("deaths", 6.0).with_missing("doctors"));
        let err = process_ranking_pipeline(&t, &indicators()).unwrap_err();
        match err {
            HcareError::NonFiniteScore { year, location } => {
                assert_eq!(year, 2000);
                assert_eq!(location, "D");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_table() {
        let t = Table::new(["deaths", "doctors"]);
        let out = process_ranking_pipeline(&t, &indicators()).unwrap();
        assert!(out.is_empty());
        assert!(out.weights().is_empty());
    }

    #[test]
    fn test_run_cached_reuses_result() {
        let pipeline = RankingPipeline::new(indicators());
        let mut cache = ScoreCache::new();
        let t = two_column_table();

        let first = pipeline.run_cached(&t, &mut cache).unwrap();
        let second = pipeline.run_cached(&t, &mut cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let mut changed = t.clone();
        changed.rows_mut()[0].set("doctors", Some(9.0));
        let third = pipeline.run_cached(&changed, &mut cache).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(&pipeline.fingerprint(&t)));
        assert_eq!(cache.len(), 1);
    }
}
