//! Tests for configuration file discovery and TOML loading
//!
//! Uses serial_test to prevent environment variable races: tests touching
//! BGM_TEST_CONFIG are marked #[serial].

use bgm_common::config::{default_data_dir, load_toml, resolve_config_file};
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

const ENV_VAR: &str = "BGM_TEST_CONFIG";

#[derive(Debug, Deserialize)]
struct SampleConfig {
    port: u16,
    #[serde(default)]
    name: Option<String>,
}

#[test]
#[serial]
fn test_cli_argument_wins_over_env() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_file(Some(Path::new("/tmp/from-cli.toml")), ENV_VAR, "x.toml");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_file(None, ENV_VAR, "x.toml");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_missing_default_file_resolves_to_none() {
    env::remove_var(ENV_VAR);

    let resolved = resolve_config_file(None, ENV_VAR, "bgm-definitely-not-present-7f3a.toml");
    assert_eq!(resolved, None);
}

#[test]
fn test_load_toml_parses_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 6000\nname = \"living-room\"").unwrap();

    let config: SampleConfig = load_toml(file.path()).unwrap();
    assert_eq!(config.port, 6000);
    assert_eq!(config.name.as_deref(), Some("living-room"));
}

#[test]
fn test_load_toml_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let err = load_toml::<SampleConfig>(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn test_load_toml_reports_missing_file() {
    let err = load_toml::<SampleConfig>(Path::new("/nonexistent/bgm.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn test_default_data_dir_is_not_empty() {
    let dir = default_data_dir();
    assert!(!dir.as_os_str().is_empty());
    assert!(dir.ends_with("bgm") || dir.ends_with("bgm_data"));
}
