//! Column names, indicator polarity, and header canonicalisation.
//!
//! Every column name the workspace refers to is declared here once. Source
//! files spell their headers in several ways ("Period", "Medical Doctors per
//! 10,000", ...); [`ColumnSchema`] maps those spellings to the canonical names
//! at the data-preparation boundary so downstream code never renames.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{HcareError, Result};

// ── Canonical column names ──────────────────────────────────────────────────
pub mod columns {
    pub const LOCATION: &str = "location";
    pub const YEAR: &str = "year";
    pub const REGION: &str = "region";

    pub const DEATHS: &str = "deaths";
    pub const INCIDENCE: &str = "incidence";

    pub const MEDICAL_DOCTORS: &str = "medical_doctors_per_10000";
    pub const NURSES_MIDWIFES: &str = "nurses_midwifes_per_10000";
    pub const DENTISTS: &str = "dentists_per_10000";
    pub const PHARMACISTS: &str = "pharmacists_per_10000";

    pub const COMPOSITE_SCORE: &str = "composite_score";
    pub const RANK: &str = "rank";
}

// ── Indicator set ───────────────────────────────────────────────────────────

/// Indicator columns split by polarity.
///
/// `negative` columns are bad-when-high (deaths, incidence), `positive`
/// columns are good-when-high (workforce density). Every name appears once
/// across both lists, and the lists are together non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(default = "default_negative")]
    pub negative: Vec<String>,

    #[serde(default = "default_positive")]
    pub positive: Vec<String>,
}

fn default_negative() -> Vec<String> {
    vec![columns::DEATHS.to_string(), columns::INCIDENCE.to_string()]
}

fn default_positive() -> Vec<String> {
    vec![
        columns::MEDICAL_DOCTORS.to_string(),
        columns::NURSES_MIDWIFES.to_string(),
        columns::DENTISTS.to_string(),
        columns::PHARMACISTS.to_string(),
    ]
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self {
            negative: default_negative(),
            positive: default_positive(),
        }
    }
}

impl IndicatorSet {
    pub fn new<N, P>(negative: N, positive: P) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            negative: negative.into_iter().map(Into::into).collect(),
            positive: positive.into_iter().map(Into::into).collect(),
        }
    }

    /// All indicator columns, negative first, in declaration order.
    pub fn all(&self) -> Vec<String> {
        self.negative
            .iter()
            .chain(self.positive.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.negative.len() + self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_negative(&self, column: &str) -> bool {
        self.negative.iter().any(|c| c == column)
    }

    /// Check the set is non-empty, that no column carries both polarities,
    /// and that no column is listed twice under the same polarity.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(HcareError::EmptyIndicatorSet);
        }
        let mut negative = BTreeSet::new();
        for column in &self.negative {
            if !negative.insert(column.as_str()) {
                return Err(HcareError::DuplicateIndicator(column.clone()));
            }
        }
        let mut positive = BTreeSet::new();
        for column in &self.positive {
            if negative.contains(column.as_str()) {
                return Err(HcareError::OverlappingIndicator(column.clone()));
            }
            if !positive.insert(column.as_str()) {
                return Err(HcareError::DuplicateIndicator(column.clone()));
            }
        }
        Ok(())
    }

    /// Check every indicator is present in `available`, reporting all that are not.
    pub fn require_columns<'a, I>(&self, available: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let available: BTreeSet<&str> = available.into_iter().collect();
        let missing: Vec<String> = self
            .all()
            .into_iter()
            .filter(|c| !available.contains(c.as_str()))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(HcareError::MissingColumns(missing))
        }
    }
}

// ── Column schema ───────────────────────────────────────────────────────────

/// Canonical names for identifying columns plus a header alias map.
///
/// Headers are trimmed, stripped of quotes, and lower-cased before the alias
/// lookup; anything without an alias keeps its cleaned spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_year")]
    pub year: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Cleaned source header -> canonical column name
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_location() -> String { columns::LOCATION.to_string() }
fn default_year() -> String { columns::YEAR.to_string() }
fn default_region() -> String { columns::REGION.to_string() }

fn default_aliases() -> BTreeMap<String, String> {
    [
        ("period", columns::YEAR),
        ("parentlocation", columns::REGION),
        ("death", columns::DEATHS),
        ("deaths", columns::DEATHS),
        ("incidence", columns::INCIDENCE),
        ("medical doctors per 10,000", columns::MEDICAL_DOCTORS),
        ("nurses and midwifes per 10,000", columns::NURSES_MIDWIFES),
        ("dentists per 10,000", columns::DENTISTS),
        ("pharmacists per 10,000", columns::PHARMACISTS),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            location: default_location(),
            year: default_year(),
            region: default_region(),
            aliases: default_aliases(),
        }
    }
}

impl ColumnSchema {
    /// Trim, drop quotes, lower-case.
    pub fn clean_header(header: &str) -> String {
        header.trim().replace('"', "").to_lowercase()
    }

    /// Canonical name for a raw source header.
    pub fn canonical(&self, header: &str) -> String {
        let cleaned = Self::clean_header(header);
        self.aliases.get(&cleaned).cloned().unwrap_or(cleaned)
    }
}

// ── Location aliases ────────────────────────────────────────────────────────

/// Per-source location renames applied before the IHME/WHO join.
///
/// Empty by default; the tables are supplied through configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationAliases {
    #[serde(default)]
    pub who: BTreeMap<String, String>,

    #[serde(default)]
    pub ihme: BTreeMap<String, String>,
}

impl LocationAliases {
    pub fn is_empty(&self) -> bool {
        self.who.is_empty() && self.ihme.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_indicator_set_is_valid() {
        let set = IndicatorSet::default();
        assert!(set.validate().is_ok());
        assert_eq!(set.len(), 6);
        assert_eq!(set.all()[0], columns::DEATHS);
        assert!(set.is_negative(columns::INCIDENCE));
        assert!(!set.is_negative(columns::DENTISTS));
    }

    #[test]
    fn test_overlapping_indicator_rejected() {
        let set = IndicatorSet::new(["deaths"], ["deaths", "nurses"]);
        match set.validate() {
            Err(HcareError::OverlappingIndicator(col)) => assert_eq!(col, "deaths"),
            other => panic!("expected overlap error, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_indicator_rejected() {
        let set = IndicatorSet::new(["deaths", "deaths"], ["nurses"]);
        match set.validate() {
            Err(HcareError::DuplicateIndicator(col)) => assert_eq!(col, "deaths"),
            other => panic!("expected duplicate error, got {other:?}"),
        }

        let set = IndicatorSet::new(["deaths"], ["nurses", "dentists", "nurses"]);
        match set.validate() {
            Err(HcareError::DuplicateIndicator(col)) => assert_eq!(col, "nurses"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_indicator_set_rejected() {
        let set = IndicatorSet::new(Vec::<String>::new(), Vec::<String>::new());
        assert!(matches!(set.validate(), Err(HcareError::EmptyIndicatorSet)));
    }

    #[test]
    fn test_require_columns_reports_all_missing() {
        let set = IndicatorSet::default();
        let err = set
            .require_columns(["deaths", columns::DENTISTS, columns::PHARMACISTS])
            .unwrap_err();
        match err {
            HcareError::MissingColumns(missing) => assert_eq!(
                missing,
                vec![
                    columns::INCIDENCE.to_string(),
                    columns::MEDICAL_DOCTORS.to_string(),
                    columns::NURSES_MIDWIFES.to_string(),
                ]
            ),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_canonical_headers() {
        let schema = ColumnSchema::default();
        assert_eq!(schema.canonical("Period"), "year");
        assert_eq!(schema.canonical(" \"Medical Doctors per 10,000\" "), columns::MEDICAL_DOCTORS);
        assert_eq!(schema.canonical("ParentLocation"), "region");
        assert_eq!(schema.canonical("Location"), "location");
        assert_eq!(schema.canonical("Something Else"), "something else");
    }
}
