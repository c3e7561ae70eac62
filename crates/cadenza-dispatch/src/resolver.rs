//! Three-tier error handler fallback
//!
//! 1. The handler configured under `errors.<status>`, else `errors.default`,
//!    built through the [`ErrorHandlerRegistry`]. Unknown or missing identifiers
//!    select [`DEFAULT_ERROR_HANDLER`].
//! 2. A [`DefaultErrorHandler`] built directly, without the container.
//! 3. A static HTML page assembled from literals, which cannot fail.
//!
//! Each tier runs only if the previous one failed or panicked.

use crate::error_handler::{DEFAULT_ERROR_HANDLER, DefaultErrorHandler, ErrorHandler, ErrorHandlerRegistry};
use crate::guard::{catch_panic, catch_panic_sync, container_error};
use cadenza_conf::Settings;
use cadenza_di::ServiceContainer;
use cadenza_http::{HttpException, Request, Response, Result};
use cadenza_template::TemplateRenderer;
use http::StatusCode;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Message of the inline page when debug output is off
pub const FALLBACK_MESSAGE: &str = "Looks like we're having some server issues.";

/// Build the last-resort error page
///
/// Always a 500. In debug mode the body shows the exception with its cause
/// chain instead of the generic message.
///
/// # Examples
///
/// ```
/// use cadenza_dispatch::resolver::{FALLBACK_MESSAGE, fallback_page};
/// use cadenza_http::HttpException;
///
/// let response = fallback_page(&HttpException::not_found(), false);
/// assert_eq!(response.status.as_u16(), 500);
/// assert!(response.body_text().contains(FALLBACK_MESSAGE));
///
/// let response = fallback_page(&HttpException::not_found(), true);
/// assert!(response.body_text().contains("<pre>[404] Not Found</pre>"));
/// ```
pub fn fallback_page(exception: &HttpException, debug: bool) -> Response {
	let detail = if debug {
		format!("<pre>{exception:#}</pre>")
	} else {
		format!("<p>{FALLBACK_MESSAGE}</p>")
	};
	let body = format!(
		"<html lang='en'><body><h1>Internal Server Error</h1>{detail}</body></html>"
	);

	Response::html(StatusCode::INTERNAL_SERVER_ERROR, body)
}

/// Selects and runs the error handler for an exception
pub struct ErrorHandlerResolver {
	settings: Arc<Settings>,
	services: ServiceContainer,
	handlers: ErrorHandlerRegistry,
	renderer: Arc<dyn TemplateRenderer>,
}

impl ErrorHandlerResolver {
	pub fn new(
		settings: Arc<Settings>,
		services: ServiceContainer,
		handlers: ErrorHandlerRegistry,
		renderer: Arc<dyn TemplateRenderer>,
	) -> Self {
		Self {
			settings,
			services,
			handlers,
			renderer,
		}
	}

	/// Identifier configured for `status`, falling back to `errors.default`
	///
	/// Empty or non-string values count as "not configured".
	pub fn configured_handler(&self, status: u16) -> Option<&str> {
		self.settings
			.get(&format!("errors.{status}"))
			.or_else(|| self.settings.get("errors.default"))
			.and_then(|value| value.as_str())
			.filter(|id| !id.is_empty())
	}

	/// Identifier tier 1 will instantiate for `status`
	pub fn handler_id(&self, status: u16) -> &str {
		match self.configured_handler(status) {
			Some(id) if self.handlers.contains(id) => id,
			Some(id) => {
				warn!(handler = id, status, "unknown error handler, using the default one");
				DEFAULT_ERROR_HANDLER
			}
			None => DEFAULT_ERROR_HANDLER,
		}
	}

	pub fn handlers(&self) -> &ErrorHandlerRegistry {
		&self.handlers
	}

	/// Turn `exception` into a response; never fails
	pub async fn resolve(&self, request: &Request, exception: &HttpException) -> Response {
		let status = exception.status_code();

		match self.configured(request, exception).await {
			Ok(response) => return response,
			Err(e) => warn!(status, error = %e, "configured error handler failed"),
		}

		match self.builtin(request, exception).await {
			Ok(response) => return response,
			Err(e) => warn!(status, error = %e, "default error handler failed"),
		}

		// Settings::debug reports a malformed flag as an error; that is not debug.
		let debug = self.settings.debug().unwrap_or(false);
		error!(status, exception = %exception, "serving inline error page");
		fallback_page(exception, debug)
	}

	async fn configured(&self, request: &Request, exception: &HttpException) -> Result<Response> {
		let id = self.handler_id(exception.status_code());
		debug!(handler = id, status = exception.status_code(), "resolving error handler");

		let handler = catch_panic_sync(|| {
			self.handlers
				.resolve(id, &self.services)
				.map_err(container_error)
		})?;
		catch_panic(handler.handle(request, exception)).await
	}

	async fn builtin(&self, request: &Request, exception: &HttpException) -> Result<Response> {
		let handler = DefaultErrorHandler::new(Arc::clone(&self.renderer))
			.with_debug(self.settings.debug().unwrap_or(false));
		catch_panic(handler.handle(request, exception)).await
	}
}
