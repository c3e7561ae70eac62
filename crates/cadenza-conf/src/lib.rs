//! # Cadenza Conf
//!
//! Layered settings for Cadenza applications.
//!
//! Values come from [`sources::ConfigSource`] implementations (defaults, TOML or
//! JSON files, environment variables) and are merged by [`SettingsBuilder`] into a
//! single [`Settings`] tree addressed with dotted keys such as `errors.404`.
//!
//! ## Keys read by the dispatcher
//!
//! | Key | Meaning |
//! |---|---|
//! | `errors.<status>` | Error handler identifier for a given status code |
//! | `errors.default` | Error handler identifier used when no status-specific one exists |
//! | `debug` | Boolean; enables exception details and the debug response header |
//!
//! ## Examples
//!
//! ```
//! use cadenza_conf::SettingsBuilder;
//! use cadenza_conf::sources::{DefaultSource, EnvSource};
//! use serde_json::json;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new().with_value("debug", json!(false)))
//!     .add_source(EnvSource::new().with_prefix("MYAPP_DOCTEST_"))
//!     .build()
//!     .unwrap();
//!
//! assert!(!settings.debug().unwrap());
//! ```

pub mod settings;
pub mod sources;

pub use settings::{DEBUG_KEY, Settings, SettingsBuilder, SettingsError};
pub use sources::{
	ConfigSource, DefaultSource, EnvSource, JsonFileSource, SourceError, TomlFileSource,
	auto_source,
};
