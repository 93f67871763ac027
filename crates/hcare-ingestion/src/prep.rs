//! End-to-end data preparation.
//!
//! Reads the IHME and WHO exports from a directory, shapes each side, reconciles
//! location names and joins them into the table the ranking pipeline consumes.
//! [`DataPrep::process_cached`] memoises the result on a fingerprint of every
//! source file's bytes plus the configuration, so a re-run over unchanged files
//! is free and a changed file can never be served stale data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use hcare_common::schema::columns;
use hcare_common::{Fingerprint, FingerprintBuilder, FingerprintCache, HcareConfig, Result, Table};

use crate::ihme::{aggregate_over_cause, drop_sex, pivot_ihme, UNUSED_COLUMNS};
use crate::merge::merge_sources;
use crate::raw::{import_data, RawFrame};
use crate::reconcile::reconcile_locations;
use crate::who::{make_workforce_data, WorkforceSource};

/// Output of one preparation run.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// IHME measures per (location, year)
    pub burden: Table,
    /// WHO workforce densities per (location, year), with region
    pub workforce: Table,
    /// Inner join of the two
    pub merged: Table,
    pub loaded_at: DateTime<Utc>,
}

pub type PrepCache = FingerprintCache<PreparedData>;

#[derive(Debug, Clone, Default)]
pub struct DataPrep {
    config: HcareConfig,
}

impl DataPrep {
    pub fn new(config: HcareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HcareConfig {
        &self.config
    }

    /// Every source file read by [`DataPrep::process`], IHME first.
    pub fn source_files(&self, dir: &Path) -> Vec<PathBuf> {
        let s = &self.config.sources;
        s.ihme_files
            .iter()
            .chain([&s.doctors_file, &s.nurses_file, &s.pharmacists_file, &s.dentists_file])
            .map(|f| dir.join(f))
            .collect()
    }

    /// Concatenate, pivot, filter and aggregate the IHME exports.
    pub fn load_burden(&self, dir: &Path) -> Result<Table> {
        let frames = self
            .config
            .sources
            .ihme_files
            .iter()
            .map(|f| import_data(&dir.join(f)))
            .collect::<Result<Vec<_>>>()?;
        let combined = RawFrame::concat(frames).drop_columns(&UNUSED_COLUMNS);
        debug!(rows = combined.len(), "Concatenated IHME exports");

        let pivoted = drop_sex(pivot_ihme(&combined, &self.config.columns)?);
        Ok(aggregate_over_cause(&pivoted))
    }

    /// Read and join the four WHO workforce exports.
    pub fn load_workforce(&self, dir: &Path) -> Result<Table> {
        let s = &self.config.sources;
        let doctors = import_data(&dir.join(&s.doctors_file))?;
        let nurses = import_data(&dir.join(&s.nurses_file))?;
        let pharmacists = import_data(&dir.join(&s.pharmacists_file))?;
        let dentists = import_data(&dir.join(&s.dentists_file))?;

        make_workforce_data(&[
            WorkforceSource { indicator: columns::MEDICAL_DOCTORS, frame: &doctors },
            WorkforceSource { indicator: columns::NURSES_MIDWIFES, frame: &nurses },
            WorkforceSource { indicator: columns::PHARMACISTS, frame: &pharmacists },
            WorkforceSource { indicator: columns::DENTISTS, frame: &dentists },
        ])
    }

    /// Run the whole preparation over the files in `dir`.
    ///
    /// The merged table is checked against the configured indicator set here,
    /// so a schema problem surfaces before any scoring starts.
    pub fn process(&self, dir: &Path) -> Result<PreparedData> {
        info!(dir = %dir.display(), "Preparing source data");

        let burden = self.load_burden(dir)?;
        let workforce = self.load_workforce(dir)?;
        let (workforce, burden) = reconcile_locations(workforce, burden, &self.config.aliases);
        let merged = merge_sources(&burden, &workforce);

        self.config
            .indicators
            .require_columns(merged.columns().iter().map(String::as_str))?;

        info!(
            burden_rows = burden.len(),
            workforce_rows = workforce.len(),
            merged_rows = merged.len(),
            "Source data prepared"
        );
        Ok(PreparedData {
            burden,
            workforce,
            merged,
            loaded_at: Utc::now(),
        })
    }

    /// Fingerprint of the source bytes and the configuration.
    pub fn fingerprint(&self, dir: &Path) -> Result<Fingerprint> {
        let mut fp = FingerprintBuilder::new();
        for path in self.source_files(dir) {
            fp.update_str(&path.to_string_lossy());
            fp.update_bytes(&std::fs::read(&path)?);
        }
        fp.update_str(&serde_json::to_string(&self.config)?);
        Ok(fp.finish())
    }

    /// [`DataPrep::process`], memoised in `cache`.
    pub fn process_cached(&self, dir: &Path, cache: &mut PrepCache) -> Result<Arc<PreparedData>> {
        let key = self.fingerprint(dir)?;
        cache.get_or_try_insert_with(key, || self.process(dir))
    }
}
