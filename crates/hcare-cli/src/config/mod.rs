//! Configuration loading for hcare.
//! Uses the `--config` path if given, then the file named by HCARE_CONFIG,
//! then hcare.toml in the current directory, and built-in defaults otherwise.

use std::path::{Path, PathBuf};

use anyhow::Context;
use hcare_common::HcareConfig;

pub const CONFIG_ENV: &str = "HCARE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "hcare.toml";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file that must exist
    File(PathBuf),
    /// hcare.toml, used only when present
    DefaultFile(PathBuf),
    Defaults,
}

/// Pick the configuration source. `explicit` wins over `env`; the default
/// file is only considered when neither is set.
pub fn resolve(explicit: Option<&Path>, env: Option<String>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::File(path.to_path_buf());
    }
    match env.filter(|v| !v.trim().is_empty()) {
        Some(path) => ConfigSource::File(PathBuf::from(path)),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.exists() {
                ConfigSource::DefaultFile(default)
            } else {
                ConfigSource::Defaults
            }
        }
    }
}

/// Load the configuration from `source`.
pub fn load_from(source: &ConfigSource) -> anyhow::Result<HcareConfig> {
    match source {
        ConfigSource::File(path) | ConfigSource::DefaultFile(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: {}\n\
                     Copy hcare.example.toml to hcare.toml and edit it.",
                    path.display()
                );
            }
            HcareConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        ConfigSource::Defaults => Ok(HcareConfig::default()),
    }
}

pub fn load(explicit: Option<&Path>) -> anyhow::Result<(HcareConfig, ConfigSource)> {
    let source = resolve(explicit, std::env::var(CONFIG_ENV).ok());
    let config = load_from(&source)?;
    Ok((config, source))
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub merged: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub top: Option<usize>,
    pub parallel: bool,
}

impl Overrides {
    pub fn apply(self, config: &mut HcareConfig) {
        if let Some(dir) = self.data_dir {
            config.sources.data_dir = dir;
        }
        if let Some(merged) = self.merged {
            config.sources.merged_file = Some(merged);
        }
        if let Some(out) = self.out {
            config.output.path = out;
        }
        if let Some(top) = self.top {
            config.output.top_n = top;
        }
        if self.parallel {
            config.execution.parallel = true;
        }
    }
}

#[cfg(test)]
mod tests;
