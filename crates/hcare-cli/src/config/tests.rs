use super::*;
use std::io::Write;

#[test]
fn test_explicit_path_wins_over_env() {
    let source = resolve(Some(Path::new("run.yaml")), Some("env.toml".to_string()));
    assert_eq!(source, ConfigSource::File(PathBuf::from("run.yaml")));
}

#[test]
fn test_env_path_used_when_no_flag() {
    let source = resolve(None, Some("env.toml".to_string()));
    assert_eq!(source, ConfigSource::File(PathBuf::from("env.toml")));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let err = load_from(&ConfigSource::File(PathBuf::from("/nonexistent/hcare.toml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_defaults_source() {
    let config = load_from(&ConfigSource::Defaults).unwrap();
    assert_eq!(config, HcareConfig::default());
}

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[output]\ntop_n = 3\n\n[execution]\nparallel = true\n\n[aliases.who]\n\"Türkiye\" = \"Turkey\""
    )
    .unwrap();

    let config = load_from(&ConfigSource::File(file.path().to_path_buf())).unwrap();
    assert_eq!(config.output.top_n, 3);
    assert!(config.execution.parallel);
    assert_eq!(config.aliases.who.get("Türkiye").map(String::as_str), Some("Turkey"));
    assert_eq!(config.indicators, hcare_common::IndicatorSet::default());
}

#[test]
fn test_overrides_apply() {
    let mut config = HcareConfig::default();
    Overrides {
        data_dir: Some(PathBuf::from("raw")),
        merged: Some(PathBuf::from("merged.csv")),
        out: None,
        top: Some(5),
        parallel: true,
    }
    .apply(&mut config);

    assert_eq!(config.sources.data_dir, PathBuf::from("raw"));
    assert_eq!(config.sources.merged_file, Some(PathBuf::from("merged.csv")));
    assert_eq!(config.output.path, PathBuf::from("ranked.csv"));
    assert_eq!(config.output.top_n, 5);
    assert!(config.execution.parallel);
}

#[test]
fn test_example_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../hcare.example.toml");
    let config = load_from(&ConfigSource::File(path)).unwrap();
    assert_eq!(config, HcareConfig::default());
}
