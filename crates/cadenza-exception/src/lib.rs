//! # Cadenza Exception
//!
//! Failure types shared by every stage of the Cadenza request pipeline.
//!
//! Two layers are provided:
//!
//! - [`HttpException`]: a failure that already knows which HTTP status it maps to.
//!   It carries a status code, a human readable message and an optional wrapped
//!   cause.
//! - [`Error`]: the framework-wide error enum returned by routers, controllers,
//!   hooks and error handlers. Anything that is not an [`Error::Http`] is turned
//!   into a 500 [`HttpException`] when it reaches the dispatcher boundary, with the
//!   original error preserved as the exception's source.
//!
//! ## Examples
//!
//! ```
//! use cadenza_exception::{Error, HttpException};
//! use http::StatusCode;
//!
//! let missing = HttpException::not_found();
//! assert_eq!(missing.status(), StatusCode::NOT_FOUND);
//!
//! let wrapped: HttpException = Error::Internal("database unreachable".into()).into();
//! assert_eq!(wrapped.status_code(), 500);
//! assert!(std::error::Error::source(&wrapped).is_some());
//! ```

mod http_exception;

pub use http_exception::HttpException;

use std::any::Any;
use thiserror::Error;

/// Result type used throughout the Cadenza crates
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a request
#[derive(Debug, Error)]
pub enum Error {
	/// A failure that already maps to an HTTP status
	#[error(transparent)]
	Http(#[from] HttpException),

	/// Internal error
	#[error("Internal error: {0}")]
	Internal(String),

	/// A component is missing or misconfigured
	#[error("Improperly configured: {0}")]
	ImproperlyConfigured(String),

	/// Template lookup or rendering failed
	#[error("Template error: {0}")]
	Template(String),

	/// A value could not be serialized into a response body
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// The service container could not produce an instance
	#[error("Container error: {0}")]
	Container(String),

	/// A route targeted a method the controller does not expose
	#[error("Unknown controller method: {0}")]
	UnknownMethod(String),

	/// A stage panicked; the payload message is kept when it is a string
	#[error("Panic: {0}")]
	Panic(String),

	/// Any other failure raised by application code
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl Error {
	/// HTTP status code this error maps to
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_exception::{Error, HttpException};
	///
	/// assert_eq!(Error::from(HttpException::not_found()).status_code(), 404);
	/// assert_eq!(Error::Internal("boom".into()).status_code(), 500);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			Error::Http(exception) => exception.status_code(),
			_ => 500,
		}
	}

	/// Build an [`Error::Panic`] from a payload caught by `catch_unwind`
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_exception::Error;
	///
	/// let payload = std::panic::catch_unwind(|| panic!("controller exploded")).unwrap_err();
	/// let error = Error::from_panic(payload);
	/// assert_eq!(error.to_string(), "Panic: controller exploded");
	/// ```
	pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
		let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
			(*message).to_string()
		} else if let Some(message) = payload.downcast_ref::<String>() {
			message.clone()
		} else {
			"non-string panic payload".to_string()
		};
		Error::Panic(message)
	}
}

impl From<Error> for HttpException {
	fn from(error: Error) -> Self {
		match error {
			Error::Http(exception) => exception,
			other => HttpException::internal_server_error().with_source(other),
		}
	}
}
