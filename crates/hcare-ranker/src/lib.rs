//! hcare-ranker: Healthcare quality scoring engine.
//!
//! Per year: min-max normalise every indicator, invert the bad-when-high
//! ones, weight indicators by first-principal-component loadings, take the
//! weighted sum, and rank by it.

pub mod normalise;
pub mod polarity;
pub mod pca;
pub mod weights;
pub mod scorer;
pub mod rank;
pub mod pipeline;
pub mod report;

pub use pipeline::{process_ranking_pipeline, RankingPipeline, ScoreCache, ScoredRecord, ScoredTable};
pub use report::HistoryPoint;
pub use weights::{FallbackReason, WeightSource, WeightVector};
