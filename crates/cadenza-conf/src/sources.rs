//! Configuration sources for the layered settings system
//!
//! Sources are merged in priority order
//! (environment variables > config files > defaults).

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Separator used in environment variable names to express nesting
///
/// `CADENZA_ERRORS__404` is loaded as the key `errors.404`.
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid source: {0}")]
	InvalidSource(String),
}

/// Environment variable configuration source
///
/// Names are lowercased, the prefix (if any) is stripped and every `__` becomes
/// a `.` so that nested keys such as `errors.default` can be overridden.
pub struct EnvSource {
	prefix: Option<String>,
}

impl EnvSource {
	/// Create a source reading every environment variable
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Only load variables starting with `prefix`
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_conf::sources::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::new().with_prefix("CADENZA_");
	/// assert_eq!(source.description(), "Environment variables (prefix: CADENZA_)");
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	fn parse_value(key: &str, value: String) -> Value {
		if key == "debug" {
			match value.trim().to_lowercase().as_str() {
				"true" | "1" | "yes" | "on" => return Value::Bool(true),
				"false" | "0" | "no" | "off" | "" => return Value::Bool(false),
				_ => return Value::String(value),
			}
		}

		if let Ok(num) = value.parse::<i64>() {
			Value::Number(num.into())
		} else if let Ok(b) = value.parse::<bool>() {
			Value::Bool(b)
		} else {
			Value::String(value)
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (key, value) in std::env::vars() {
			let clean_key = match &self.prefix {
				Some(prefix) => match key.strip_prefix(prefix.as_str()) {
					Some(stripped) => stripped,
					None => continue,
				},
				None => key.as_str(),
			};
			if clean_key.is_empty() {
				continue;
			}

			let normalized = clean_key
				.to_lowercase()
				.replace(ENV_NESTING_SEPARATOR, ".");
			let parsed = Self::parse_value(&normalized, value);
			config.insert(normalized, parsed);
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("Environment variables (prefix: {})", prefix),
			None => "Environment variables".to_string(),
		}
	}
}

fn root_object(value: Value) -> Result<IndexMap<String, Value>, SourceError> {
	match value {
		Value::Object(map) => Ok(map.into_iter().collect()),
		_ => Err(SourceError::Parse("Expected object at root".to_string())),
	}
}

/// TOML file configuration source; a missing file loads as empty
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_conf::sources::TomlFileSource;
	///
	/// let source = TomlFileSource::new("cadenza.toml");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		root_object(json_value)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// JSON file configuration source; a missing file loads as empty
pub struct JsonFileSource {
	path: PathBuf,
}

impl JsonFileSource {
	/// Create a new JSON file configuration source
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for JsonFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let json_value: Value = serde_json::from_str(&content)?;

		root_object(json_value)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("JSON file: {}", self.path.display())
	}
}

/// Default values configuration source
///
/// Keys may be dotted (`errors.default`); they are expanded when settings are built.
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	/// Create an empty default source
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_conf::sources::{ConfigSource, DefaultSource};
	/// use serde_json::json;
	///
	/// let source = DefaultSource::new()
	///     .with_value("debug", json!(false))
	///     .with_value("errors.default", json!("cadenza.default_error_handler"));
	///
	/// assert_eq!(source.load().unwrap().len(), 2);
	/// ```
	pub fn new() -> Self {
		Self {
			values: IndexMap::new(),
		}
	}

	/// Add a default value for a configuration key
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

/// Pick a file source from the path's extension
///
/// # Examples
///
/// ```
/// use cadenza_conf::sources::auto_source;
///
/// let toml = auto_source("settings/base.toml").unwrap();
/// assert_eq!(toml.description(), "TOML file: settings/base.toml");
///
/// assert!(auto_source("settings/base.yaml").is_err());
/// ```
pub fn auto_source(path: impl AsRef<Path>) -> Result<Box<dyn ConfigSource>, SourceError> {
	let path = path.as_ref();
	let ext = path
		.extension()
		.and_then(|e| e.to_str())
		.ok_or_else(|| SourceError::InvalidSource("No file extension".to_string()))?;

	match ext {
		"toml" => Ok(Box::new(TomlFileSource::new(path))),
		"json" => Ok(Box::new(JsonFileSource::new(path))),
		_ => Err(SourceError::InvalidSource(format!(
			"Unsupported file extension: {}",
			ext
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use serial_test::serial;
	use std::env;
	use tempfile::TempDir;

	#[rstest]
	#[serial(env)]
	fn test_env_source_nesting_and_prefix() {
		// SAFETY: serialized with every other environment-mutating test
		unsafe {
			env::set_var("CADENZA_TEST_ERRORS__404", "app.not_found");
			env::set_var("CADENZA_TEST_DEBUG", "on");
			env::set_var("CADENZA_TEST_WORKERS", "4");
		}

		let config = EnvSource::new()
			.with_prefix("CADENZA_TEST_")
			.load()
			.unwrap();

		assert_eq!(config.get("errors.404"), Some(&json!("app.not_found")));
		assert_eq!(config.get("debug"), Some(&json!(true)));
		assert_eq!(config.get("workers"), Some(&json!(4)));
		assert!(config.keys().all(|key| !key.starts_with("cadenza_test_")));

		// SAFETY: see above
		unsafe {
			env::remove_var("CADENZA_TEST_ERRORS__404");
			env::remove_var("CADENZA_TEST_DEBUG");
			env::remove_var("CADENZA_TEST_WORKERS");
		}
	}

	#[rstest]
	#[case("true", json!(true))]
	#[case("0", json!(false))]
	#[case("maybe", json!("maybe"))]
	fn test_debug_parsing(#[case] raw: &str, #[case] expected: Value) {
		assert_eq!(EnvSource::parse_value("debug", raw.to_string()), expected);
	}

	#[rstest]
	fn test_toml_source_nested_tables() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("cadenza.toml");
		fs::write(
			&path,
			r#"
debug = true

[errors]
404 = "app.not_found"
default = "app.errors"
"#,
		)
		.unwrap();

		let config = TomlFileSource::new(&path).load().unwrap();

		assert_eq!(config.get("debug"), Some(&json!(true)));
		assert_eq!(
			config.get("errors"),
			Some(&json!({"404": "app.not_found", "default": "app.errors"}))
		);
	}

	#[rstest]
	fn test_json_source_requires_object_root() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("cadenza.json");
		fs::write(&path, "[1, 2, 3]").unwrap();

		let error = JsonFileSource::new(&path).load().unwrap_err();
		assert!(matches!(error, SourceError::Parse(_)));
	}

	#[rstest]
	fn test_missing_files_load_empty() {
		let temp_dir = TempDir::new().unwrap();

		let toml = TomlFileSource::new(temp_dir.path().join("absent.toml"));
		let json = JsonFileSource::new(temp_dir.path().join("absent.json"));

		assert!(toml.load().unwrap().is_empty());
		assert!(json.load().unwrap().is_empty());
	}

	#[rstest]
	fn test_source_priority() {
		assert_eq!(EnvSource::new().priority(), 100);
		assert_eq!(TomlFileSource::new("a.toml").priority(), 50);
		assert_eq!(JsonFileSource::new("a.json").priority(), 50);
		assert_eq!(DefaultSource::new().priority(), 0);
	}
}
