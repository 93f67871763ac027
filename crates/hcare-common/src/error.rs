use thiserror::Error;

#[derive(Debug, Error)]
pub enum HcareError {
    #[error("Schema error: missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Schema error: indicator '{0}' is declared both negative and positive")]
    OverlappingIndicator(String),

    #[error("Schema error: indicator '{0}' is declared more than once")]
    DuplicateIndicator(String),

    #[error("Schema error: no indicator columns declared")]
    EmptyIndicatorSet,

    #[error("Non-finite composite score for '{location}' in {year}")]
    NonFiniteScore { year: i32, location: String },

    #[error("Parse error in column '{column}': cannot read '{value}'")]
    Parse { column: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HcareError>;
