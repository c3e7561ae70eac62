use crate::{CONFIG_SERVICE, TEMPLATING_SERVICE};
use async_trait::async_trait;
use cadenza_conf::Settings;
use cadenza_di::{FactoryRegistry, ServiceContainer};
use cadenza_http::{Error, HttpException, Request, Response, Result};
use cadenza_template::{ERROR_PAGE_TEMPLATE, TemplateRenderer};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Identifier the built-in [`DefaultErrorHandler`] is registered under
pub const DEFAULT_ERROR_HANDLER: &str = "cadenza.default_error_handler";

/// Turns an exception into a response
#[async_trait]
pub trait ErrorHandler: Send + Sync {
	async fn handle(&self, request: &Request, exception: &HttpException) -> Result<Response>;
}

/// Error handler factories keyed by the identifiers used in `errors.*` settings
pub type ErrorHandlerRegistry = FactoryRegistry<dyn ErrorHandler, ServiceContainer>;

/// Registry holding only the built-in handler
///
/// The handler takes its renderer from the `templating` service and its debug
/// flag from the `config` service.
pub fn default_error_handlers() -> ErrorHandlerRegistry {
	FactoryRegistry::new().with(DEFAULT_ERROR_HANDLER, |services: &ServiceContainer| {
		let renderer = services.require::<Arc<dyn TemplateRenderer>>(TEMPLATING_SERVICE)?;
		let debug = services
			.get::<Settings>(CONFIG_SERVICE)
			.is_some_and(|settings| settings.debug().unwrap_or(false));
		Ok(Box::new(DefaultErrorHandler::new((*renderer).clone()).with_debug(debug))
			as Box<dyn ErrorHandler>)
	})
}

/// Renders the built-in error page
///
/// The page is rendered with `request` (method, uri, path, attributes) and
/// `exception` (status, message, and in debug mode the full cause chain as
/// `detail`). The response carries the exception status and its message as
/// reason phrase. Rendering failures are returned to the caller.
#[derive(Clone)]
pub struct DefaultErrorHandler {
	renderer: Arc<dyn TemplateRenderer>,
	template: String,
	debug: bool,
}

impl DefaultErrorHandler {
	pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
		Self {
			renderer,
			template: ERROR_PAGE_TEMPLATE.to_string(),
			debug: false,
		}
	}

	/// Render another template instead of the built-in page
	pub fn with_template(mut self, template: impl Into<String>) -> Self {
		self.template = template.into();
		self
	}

	/// Expose the exception's cause chain to the template
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	fn context(&self, request: &Request, exception: &HttpException) -> Value {
		let attributes: Map<String, Value> = request
			.attributes()
			.iter()
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();

		let mut exception_context = json!({
			"status": exception.status_code(),
			"message": exception.message(),
		});
		if self.debug {
			exception_context["detail"] = Value::String(format!("{exception:#}"));
		}

		json!({
			"request": {
				"method": request.method.as_str(),
				"uri": request.uri.to_string(),
				"path": request.path(),
				"attributes": attributes,
			},
			"exception": exception_context,
		})
	}
}

#[async_trait]
impl ErrorHandler for DefaultErrorHandler {
	async fn handle(&self, request: &Request, exception: &HttpException) -> Result<Response> {
		let body = self
			.renderer
			.render(&self.template, &self.context(request, exception))
			.map_err(|e| Error::Template(e.to_string()))?;

		Ok(Response::html(exception.status(), body).with_reason(exception.message()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cadenza_template::{TemplateError, TeraRenderer};
	use http::StatusCode;
	use rstest::{fixture, rstest};

	struct FailingRenderer;

	impl TemplateRenderer for FailingRenderer {
		fn render(&self, name: &str, _context: &Value) -> std::result::Result<String, TemplateError> {
			Err(TemplateError::NotFound(name.to_string()))
		}

		fn has_template(&self, _name: &str) -> bool {
			false
		}
	}

	#[fixture]
	fn renderer() -> Arc<dyn TemplateRenderer> {
		Arc::new(TeraRenderer::new().unwrap())
	}

	#[fixture]
	fn request() -> Request {
		Request::builder()
			.uri("/articles/42")
			.attribute("_locale", "nl_NL")
			.build()
			.unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_renders_status_and_reason(renderer: Arc<dyn TemplateRenderer>, request: Request) {
		let exception = HttpException::new(StatusCode::NOT_FOUND, "Article not found");

		let response = DefaultErrorHandler::new(renderer)
			.handle(&request, &exception)
			.await
			.unwrap();

		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert_eq!(response.reason_phrase(), "Article not found");
		assert_eq!(
			response.headers.get("content-type").unwrap(),
			"text/html; charset=utf-8"
		);
		assert!(response.body_text().contains("Article not found"));
		assert!(response.body_text().contains("GET &#x2F;articles&#x2F;42"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_reason_cannot_inject_header_lines(renderer: Arc<dyn TemplateRenderer>, request: Request) {
		let exception = HttpException::new(StatusCode::GONE, "Gone\rSet-Cookie: s=1");

		let response = DefaultErrorHandler::new(renderer)
			.handle(&request, &exception)
			.await
			.unwrap();

		let mut out = Vec::new();
		response.write_to(&mut out).unwrap();
		let printed = String::from_utf8(out).unwrap();
		let (head, _) = printed.split_once("\r\n\r\n").unwrap();
		let status_line = head.lines().next().unwrap();

		assert_eq!(response.reason_phrase(), "Gone");
		assert_eq!(status_line, "HTTP/1.1 410 Gone");
		assert!(!head.contains("Set-Cookie"));
		assert!(response.headers.get("set-cookie").is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_detail_only_in_debug(renderer: Arc<dyn TemplateRenderer>, request: Request) {
		let exception = HttpException::internal_server_error()
			.with_source(std::io::Error::other("replica lag"));

		let quiet = DefaultErrorHandler::new(renderer.clone())
			.handle(&request, &exception)
			.await
			.unwrap();
		let verbose = DefaultErrorHandler::new(renderer)
			.with_debug(true)
			.handle(&request, &exception)
			.await
			.unwrap();

		assert!(!quiet.body_text().contains("replica lag"));
		assert!(verbose.body_text().contains("Caused by: replica lag"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_multiline_message_reason(renderer: Arc<dyn TemplateRenderer>, request: Request) {
		let exception = HttpException::new(StatusCode::BAD_REQUEST, "Invalid form\nfield: title");

		let response = DefaultErrorHandler::new(renderer)
			.handle(&request, &exception)
			.await
			.unwrap();

		assert_eq!(response.reason_phrase(), "Invalid form");
	}

	#[rstest]
	#[tokio::test]
	async fn test_render_failure_propagates(request: Request) {
		let handler = DefaultErrorHandler::new(Arc::new(FailingRenderer));

		let error = handler
			.handle(&request, &HttpException::not_found())
			.await
			.unwrap_err();

		assert!(matches!(error, Error::Template(_)));
	}

	#[rstest]
	fn test_default_registry_needs_templating_service() {
		let registry = default_error_handlers();
		let services = ServiceContainer::new();

		assert!(registry.contains(DEFAULT_ERROR_HANDLER));
		assert!(registry.resolve(DEFAULT_ERROR_HANDLER, &services).is_err());

		let renderer: Arc<dyn TemplateRenderer> = Arc::new(FailingRenderer);
		services.register(TEMPLATING_SERVICE, Arc::new(renderer));
		assert!(registry.resolve(DEFAULT_ERROR_HANDLER, &services).is_ok());
	}
}
