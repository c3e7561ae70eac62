//! # Cadenza Template
//!
//! Template rendering behind the [`TemplateRenderer`] trait, with a
//! [`TeraRenderer`] implementation that ships the framework's built-in pages.
//!
//! ## Examples
//!
//! ```
//! use cadenza_template::{TemplateRenderer, TeraRenderer};
//! use serde_json::json;
//!
//! let mut renderer = TeraRenderer::new().unwrap();
//! renderer.add_raw_template("hello.txt", "Hello {{ name }}!").unwrap();
//!
//! let output = renderer.render("hello.txt", &json!({"name": "World"})).unwrap();
//! assert_eq!(output, "Hello World!");
//! ```

mod tera_renderer;

pub use tera_renderer::TeraRenderer;

use serde_json::Value;

/// Identifier of the built-in HTTP error page
pub const ERROR_PAGE_TEMPLATE: &str = "@cadenza/http/error.html";

/// Errors raised by template renderers
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
	#[error("Template not found: {0}")]
	NotFound(String),

	#[error("Invalid template context: {0}")]
	Context(String),

	#[error("Failed to render '{name}': {message}")]
	Render { name: String, message: String },

	#[error("Failed to load templates: {0}")]
	Load(String),
}

/// A template engine as seen by the rest of the framework
pub trait TemplateRenderer: Send + Sync {
	/// Render the template `name` with `context` (a JSON object) bound as variables
	fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError>;

	/// Whether a template named `name` is known
	fn has_template(&self, name: &str) -> bool;
}
