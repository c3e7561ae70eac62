//! Integration tests for building settings from files and the environment

use cadenza_conf::{
	DefaultSource, EnvSource, JsonFileSource, SettingsBuilder, TomlFileSource, auto_source,
};
use rstest::*;
use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

/// Fixture providing a directory with a TOML and a JSON settings file
#[fixture]
fn config_dir() -> TempDir {
	let dir = TempDir::new().expect("Failed to create temporary directory");
	fs::write(
		dir.path().join("base.toml"),
		r#"
debug = false

[errors]
default = "app.errors.page"
404 = "app.errors.missing"
"#,
	)
	.expect("Failed to write base.toml");
	fs::write(
		dir.path().join("local.json"),
		r#"{"errors": {"500": "app.errors.crash"}}"#,
	)
	.expect("Failed to write local.json");
	dir
}

/// Test: file layers merge their nested tables
///
/// **Category**: Happy Path
#[rstest]
fn test_toml_and_json_merge(config_dir: TempDir) {
	let settings = SettingsBuilder::new()
		.add_source(TomlFileSource::new(config_dir.path().join("base.toml")))
		.add_source(JsonFileSource::new(config_dir.path().join("local.json")))
		.build()
		.unwrap();

	assert_eq!(settings.get_str("errors.default"), Some("app.errors.page"));
	assert_eq!(settings.get_str("errors.404"), Some("app.errors.missing"));
	assert_eq!(settings.get_str("errors.500"), Some("app.errors.crash"));
	assert!(!settings.debug().unwrap());
}

/// Test: environment variables override file values for nested keys
///
/// **Category**: Happy Path
#[rstest]
#[serial(env)]
fn test_env_overrides_files(config_dir: TempDir) {
	// SAFETY: serialized with every other environment-mutating test
	unsafe {
		env::set_var("LAYERED_IT_DEBUG", "true");
		env::set_var("LAYERED_IT_ERRORS__404", "env.errors.missing");
	}

	let settings = SettingsBuilder::new()
		.add_source(EnvSource::new().with_prefix("LAYERED_IT_"))
		.add_boxed_source(auto_source(config_dir.path().join("base.toml")).unwrap())
		.add_source(DefaultSource::new().with_value("errors.403", json!("defaults.forbidden")))
		.build();

	// SAFETY: see above
	unsafe {
		env::remove_var("LAYERED_IT_DEBUG");
		env::remove_var("LAYERED_IT_ERRORS__404");
	}

	let settings = settings.unwrap();
	assert!(settings.debug().unwrap());
	assert_eq!(settings.get_str("errors.404"), Some("env.errors.missing"));
	assert_eq!(settings.get_str("errors.default"), Some("app.errors.page"));
	assert_eq!(settings.get_str("errors.403"), Some("defaults.forbidden"));
}

/// Test: a malformed file surfaces as a build error
///
/// **Category**: Error Path
#[rstest]
fn test_invalid_toml_fails_build(config_dir: TempDir) {
	let path = config_dir.path().join("broken.toml");
	fs::write(&path, "debug = = true").unwrap();

	let result = SettingsBuilder::new()
		.add_source(TomlFileSource::new(&path))
		.build();

	assert!(result.is_err());
}

/// Test: a missing optional file leaves settings empty
///
/// **Category**: Edge Case
#[rstest]
fn test_missing_file_is_empty(config_dir: TempDir) {
	let settings = SettingsBuilder::new()
		.add_source(TomlFileSource::new(config_dir.path().join("absent.toml")))
		.build()
		.unwrap();

	assert!(settings.as_map().is_empty());
}
