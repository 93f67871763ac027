//! hcare-ingestion: Data preparation for the ranking pipeline.
//! Turns the raw public exports into one tidy country-year table:
//! - CSV import with missing-value handling
//! - IHME pivot, sex filter and cause aggregation
//! - WHO workforce merge
//! - Location reconciliation and the final inner join
//! - Reading an already-merged table
//! - Fingerprint-cached loading

pub mod raw;
pub mod ihme;
pub mod who;
pub mod reconcile;
pub mod merge;
pub mod merged_table;
pub mod prep;

pub use raw::{import_data, RawFrame};
pub use ihme::{aggregate_over_cause, drop_sex, pivot_ihme, PivotRow, PivotedIhme};
pub use who::{make_workforce_data, WorkforceSource};
pub use reconcile::reconcile_locations;
pub use merge::merge_sources;
pub use merged_table::read_merged_table;
pub use prep::{DataPrep, PrepCache, PreparedData};
