//! Layered settings.
//!
//! # Examples
//!
//! ```rust
//! use cadenza::conf::{DefaultSource, SettingsBuilder};
//! use serde_json::json;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new().with_value("errors.default", json!("app.errors")))
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.get_str("errors.default"), Some("app.errors"));
//! ```

pub use cadenza_conf::*;
