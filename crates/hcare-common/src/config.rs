//! Run configuration for the hcare workspace.
//!
//! Loaded from TOML, YAML or JSON. Every section and field has a default, so an
//! empty file (or no file at all) describes the standard IHME + WHO run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HcareError, Result};
use crate::schema::{ColumnSchema, IndicatorSet, LocationAliases};

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HcareConfig {
    /// Indicator polarity
    #[serde(default)]
    pub indicators: IndicatorSet,

    /// Canonical column names and header aliases
    #[serde(default)]
    pub columns: ColumnSchema,

    /// Source file locations
    #[serde(default)]
    pub sources: SourceConfig,

    /// Location renames applied before the join
    #[serde(default)]
    pub aliases: LocationAliases,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,

    /// Execution options
    #[serde(default)]
    pub execution: ExecutionConfig,
}

// ── Sources ─────────────────────────────────────────────────────────────────

/// Where the raw IHME and WHO files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the raw source files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Already-merged table; when set, raw preparation is skipped
    #[serde(default)]
    pub merged_file: Option<PathBuf>,

    /// IHME long-format exports, concatenated before pivoting
    #[serde(default = "default_ihme_files")]
    pub ihme_files: Vec<String>,

    #[serde(default = "default_doctors_file")]
    pub doctors_file: String,

    #[serde(default = "default_nurses_file")]
    pub nurses_file: String,

    #[serde(default = "default_pharmacists_file")]
    pub pharmacists_file: String,

    #[serde(default = "default_dentists_file")]
    pub dentists_file: String,
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_ihme_files() -> Vec<String> { vec!["IHME-1.csv".to_string(), "IHME-2.csv".to_string()] }
fn default_doctors_file() -> String { "medical-doctors.csv".to_string() }
fn default_nurses_file() -> String { "nursery-midwifery.csv".to_string() }
fn default_pharmacists_file() -> String { "pharmacists.csv".to_string() }
fn default_dentists_file() -> String { "dentistry.csv".to_string() }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            merged_file: None,
            ihme_files: default_ihme_files(),
            doctors_file: default_doctors_file(),
            nurses_file: default_nurses_file(),
            pharmacists_file: default_pharmacists_file(),
            dentists_file: default_dentists_file(),
        }
    }
}

// ── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Scored table CSV destination
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Rows shown in the top-N report
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_output_path() -> PathBuf { PathBuf::from("ranked.csv") }
fn default_top_n() -> usize { 10 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            top_n: default_top_n(),
        }
    }
}

// ── Execution ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Score year partitions on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

// ── Helper Methods ──────────────────────────────────────────────────────────

impl HcareConfig {
    /// Load from YAML file
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load from JSON file
    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from TOML file
    pub fn from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load by file extension (`.toml`, `.yaml`/`.yml`, `.json`) and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config = match ext.as_deref() {
            Some("toml") => Self::from_toml(path)?,
            Some("yaml") | Some("yml") => Self::from_yaml(path)?,
            Some("json") => Self::from_json(path)?,
            _ => {
                return Err(HcareError::Config(format!(
                    "unsupported config format: {}",
                    path.display()
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        if self.sources.merged_file.is_none() && self.sources.ihme_files.is_empty() {
            return Err(HcareError::Config(
                "sources.ihme_files is empty and no merged_file is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a source file name against the data directory.
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.sources.data_dir.join(file)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = HcareConfig::default();
        assert_eq!(config.indicators.negative, vec!["deaths", "incidence"]);
        assert_eq!(config.sources.ihme_files.len(), 2);
        assert_eq!(config.output.top_n, 10);
        assert!(!config.execution.parallel);
        assert!(config.aliases.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: HcareConfig = toml::from_str("").unwrap();
        assert_eq!(config, HcareConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: HcareConfig = toml::from_str(
            r#"
            [indicators]
            negative = ["deaths"]

            [output]
            top_n = 3

            [aliases.who]
            "Türkiye" = "Turkey"
            "#,
        )
        .unwrap();
        assert_eq!(config.indicators.negative, vec!["deaths"]);
        assert_eq!(config.indicators.positive.len(), 4);
        assert_eq!(config.output.top_n, 3);
        assert_eq!(config.aliases.who.get("Türkiye").map(String::as_str), Some("Turkey"));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcare.yaml");
        HcareConfig::default().to_yaml(&path).unwrap();
        let parsed = HcareConfig::load(&path).unwrap();
        assert_eq!(parsed, HcareConfig::default());

        let bad = dir.path().join("hcare.ini");
        std::fs::File::create(&bad).unwrap().write_all(b"x").unwrap();
        assert!(matches!(HcareConfig::load(&bad), Err(HcareError::Config(_))));
    }

    #[test]
    fn test_load_rejects_overlapping_indicators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcare.json");
        std::fs::write(
            &path,
            r#"{"indicators": {"negative": ["deaths"], "positive": ["deaths"]}}"#,
        )
        .unwrap();
        assert!(matches!(
            HcareConfig::load(&path),
            Err(HcareError::OverlappingIndicator(_))
        ));
    }
}
