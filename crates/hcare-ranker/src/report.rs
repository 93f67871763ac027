//! Read-side queries over a ranked table: top-N per year and a location's
//! score/rank history across years.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pipeline::{ScoredRecord, ScoredTable};

/// One year of a location's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub year: i32,
    pub composite_score: f64,
    pub rank: u32,
}

impl ScoredTable {
    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.weights().keys().copied().collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.weights().keys().next_back().copied()
    }

    /// Best `n` rows of `year`, best first. Tied rows at the cut-off are
    /// ordered by location, like the rest of the table.
    pub fn top_n(&self, year: i32, n: usize) -> Vec<&ScoredRecord> {
        self.rows()
            .iter()
            .filter(|r| r.year() == year)
            .take(n)
            .collect()
    }

    /// Score and rank of `location` for every year it appears, ascending.
    pub fn location_history(&self, location: &str) -> Vec<HistoryPoint> {
        self.rows()
            .iter()
            .filter(|r| r.location() == location)
            .map(|r| HistoryPoint {
                year: r.year(),
                composite_score: r.composite_score,
                rank: r.rank,
            })
            .collect()
    }

    /// Distinct locations, sorted.
    pub fn locations(&self) -> Vec<&str> {
        self.rows()
            .iter()
            .map(ScoredRecord::location)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
