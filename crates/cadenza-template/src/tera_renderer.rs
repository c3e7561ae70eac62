//! Tera-backed renderer
//!
//! HTML templates (`.html`, `.htm`, `.xml`) are auto-escaped by Tera.

use crate::{ERROR_PAGE_TEMPLATE, TemplateError, TemplateRenderer};
use serde_json::Value;
use std::error::Error as StdError;
use tera::{Context, ErrorKind, Tera};

const ERROR_PAGE_SOURCE: &str = include_str!("../templates/error.html");

/// Renderer delegating to a [`Tera`] instance
///
/// Every instance knows [`ERROR_PAGE_TEMPLATE`]. Application templates can be
/// loaded from a glob or added one by one; a template registered under the
/// same name replaces the built-in page.
#[derive(Debug)]
pub struct TeraRenderer {
	tera: Tera,
}

impl TeraRenderer {
	/// Renderer holding only the built-in templates
	pub fn new() -> Result<Self, TemplateError> {
		Self::with_tera(Tera::default())
	}

	/// Renderer loading every template matched by `glob`
	///
	/// # Examples
	///
	/// ```no_run
	/// use cadenza_template::{TeraRenderer, TemplateRenderer};
	///
	/// let renderer = TeraRenderer::from_glob("templates/**/*.html").unwrap();
	/// assert!(renderer.has_template("@cadenza/http/error.html"));
	/// ```
	pub fn from_glob(glob: &str) -> Result<Self, TemplateError> {
		let tera = Tera::new(glob).map_err(|e| TemplateError::Load(describe(&e)))?;
		tracing::debug!(glob, templates = tera.get_template_names().count(), "templates loaded");
		Self::with_tera(tera)
	}

	/// Wrap an existing Tera instance, adding the built-in templates it lacks
	pub fn with_tera(mut tera: Tera) -> Result<Self, TemplateError> {
		if !tera.get_template_names().any(|name| name == ERROR_PAGE_TEMPLATE) {
			tera.add_raw_template(ERROR_PAGE_TEMPLATE, ERROR_PAGE_SOURCE)
				.map_err(|e| TemplateError::Load(describe(&e)))?;
		}
		Ok(Self { tera })
	}

	/// Register a template from source
	pub fn add_raw_template(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
		self.tera
			.add_raw_template(name, source)
			.map_err(|e| TemplateError::Load(describe(&e)))
	}

	/// Names of every registered template, sorted
	pub fn template_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.tera.get_template_names().collect();
		names.sort_unstable();
		names
	}
}

impl TemplateRenderer for TeraRenderer {
	fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
		let context = match context {
			Value::Null => Context::new(),
			value => Context::from_value(value.clone())
				.map_err(|e| TemplateError::Context(describe(&e)))?,
		};

		self.tera.render(name, &context).map_err(|e| match &e.kind {
			ErrorKind::TemplateNotFound(missing) => TemplateError::NotFound(missing.clone()),
			_ => TemplateError::Render {
				name: name.to_string(),
				message: describe(&e),
			},
		})
	}

	fn has_template(&self, name: &str) -> bool {
		self.tera.get_template_names().any(|known| known == name)
	}
}

// Tera keeps the useful part of a failure in the source chain.
fn describe(error: &tera::Error) -> String {
	let mut message = error.to_string();
	let mut cause = error.source();
	while let Some(current) = cause {
		message.push_str(": ");
		message.push_str(&current.to_string());
		cause = current.source();
	}
	message
}
