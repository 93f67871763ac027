//! hcare-common: Shared types, errors and configuration used across all hcare crates.

pub mod error;
pub mod schema;
pub mod table;
pub mod cache;
pub mod config;

// Re-export commonly used types
pub use error::{HcareError, Result};
pub use schema::{ColumnSchema, IndicatorSet};
pub use table::{Record, Table};
pub use cache::{Fingerprint, FingerprintBuilder, FingerprintCache};
pub use config::HcareConfig;
