//! Merged settings and the builder that layers sources together

use crate::sources::{ConfigSource, SourceError};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Key holding the debug flag
pub const DEBUG_KEY: &str = "debug";

/// Errors raised while building or reading settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Source '{description}' failed: {source}")]
	Source {
		description: String,
		#[source]
		source: SourceError,
	},

	#[error("Setting not found: {0}")]
	NotFound(String),

	#[error("Setting '{key}' has an invalid type: expected {expected}")]
	InvalidType { key: String, expected: &'static str },

	#[error("Setting '{key}' could not be deserialized: {source}")]
	Deserialize {
		key: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Read-only view over the merged configuration tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
	values: Map<String, Value>,
}

impl Settings {
	/// Settings with no values at all
	pub fn new() -> Self {
		Self::default()
	}

	/// Build settings straight from a map; dotted keys are expanded
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_conf::Settings;
	/// use indexmap::IndexMap;
	/// use serde_json::json;
	///
	/// let mut values = IndexMap::new();
	/// values.insert("errors.404".to_string(), json!("app.not_found"));
	///
	/// let settings = Settings::from_map(values);
	/// assert_eq!(settings.get("errors"), Some(&json!({"404": "app.not_found"})));
	/// ```
	pub fn from_map(values: IndexMap<String, Value>) -> Self {
		let mut settings = Self::new();
		merge_layer(&mut settings.values, values);
		settings
	}

	/// Look up a value by dotted path
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_conf::{SettingsBuilder, sources::DefaultSource};
	/// use serde_json::json;
	///
	/// let settings = SettingsBuilder::new()
	///     .add_source(DefaultSource::new().with_value("errors", json!({"default": "app.errors"})))
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(settings.get("errors.default"), Some(&json!("app.errors")));
	/// assert_eq!(settings.get("errors.404"), None);
	/// ```
	pub fn get(&self, key: &str) -> Option<&Value> {
		let mut segments = key.split('.');
		let first = segments.next()?;
		segments.try_fold(self.values.get(first)?, |current, segment| {
			current.as_object()?.get(segment)
		})
	}

	/// Typed lookup with a fallback used when the key is absent or mistyped
	pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
		self.get_as(key).unwrap_or(default)
	}

	/// Deserialize the value at `key`
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
		let value = self
			.get(key)
			.ok_or_else(|| SettingsError::NotFound(key.to_string()))?;
		serde_json::from_value(value.clone()).map_err(|source| SettingsError::Deserialize {
			key: key.to_string(),
			source,
		})
	}

	/// String value at `key`, if it is present and a string
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Read the debug flag
	///
	/// An absent flag means "not debug". A flag that is present but not a
	/// boolean is reported as an error; callers decide how to treat it.
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_conf::{SettingsBuilder, sources::DefaultSource};
	/// use serde_json::json;
	///
	/// let settings = SettingsBuilder::new()
	///     .add_source(DefaultSource::new().with_value("debug", json!("verbose")))
	///     .build()
	///     .unwrap();
	///
	/// assert!(settings.debug().is_err());
	/// assert!(!settings.debug().unwrap_or(false));
	/// ```
	pub fn debug(&self) -> Result<bool, SettingsError> {
		match self.get(DEBUG_KEY) {
			None | Some(Value::Null) => Ok(false),
			Some(Value::Bool(flag)) => Ok(*flag),
			Some(_) => Err(SettingsError::InvalidType {
				key: DEBUG_KEY.to_string(),
				expected: "boolean",
			}),
		}
	}

	/// Entries of the object at `key`; empty when absent or not an object
	pub fn section(&self, key: &str) -> impl Iterator<Item = (&String, &Value)> {
		self.get(key)
			.and_then(Value::as_object)
			.into_iter()
			.flat_map(|map| map.iter())
	}

	/// The whole merged tree
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.values
	}
}

/// Layers [`ConfigSource`]s into [`Settings`]
///
/// Sources are applied in ascending priority; at equal priority the one added
/// last wins. Objects are merged key by key, anything else is replaced.
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a configuration source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Add an already boxed source, such as the one returned by [`crate::sources::auto_source`]
	pub fn add_boxed_source(mut self, source: Box<dyn ConfigSource>) -> Self {
		self.sources.push(source);
		self
	}

	/// Load every source and merge the results
	pub fn build(mut self) -> Result<Settings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut settings = Settings::new();
		for source in &self.sources {
			let description = source.description();
			let layer = source.load().map_err(|source| SettingsError::Source {
				description: description.clone(),
				source,
			})?;
			debug!(source = %description, keys = layer.len(), "merging configuration source");
			merge_layer(&mut settings.values, layer);
		}

		Ok(settings)
	}
}

fn merge_layer(target: &mut Map<String, Value>, layer: IndexMap<String, Value>) {
	for (key, value) in layer {
		let expanded = key
			.rsplit('.')
			.fold(value, |inner, segment| {
				let mut wrapper = Map::new();
				wrapper.insert(segment.to_string(), inner);
				Value::Object(wrapper)
			});
		if let Value::Object(map) = expanded {
			for (k, v) in map {
				merge_value(target, k, v);
			}
		}
	}
}

fn merge_value(target: &mut Map<String, Value>, key: String, value: Value) {
	match (target.get_mut(&key), value) {
		(Some(Value::Object(existing)), Value::Object(incoming)) => {
			for (k, v) in incoming {
				merge_value(existing, k, v);
			}
		}
		(_, value) => {
			target.insert(key, value);
		}
	}
}
