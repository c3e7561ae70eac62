use http::StatusCode;
use std::error::Error as StdError;
use std::fmt;

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// A failure carrying the HTTP status it should be reported with
///
/// `Display` prints `[<status>] <message>`. The alternate form (`{:#}`)
/// appends the chain of wrapped causes, one per line, and is what debug
/// pages show.
pub struct HttpException {
	status: StatusCode,
	message: String,
	source: Option<BoxedCause>,
}

impl HttpException {
	/// Create an exception with an explicit status and message
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_exception::HttpException;
	/// use http::StatusCode;
	///
	/// let exception = HttpException::new(StatusCode::GONE, "Article removed");
	/// assert_eq!(exception.status_code(), 410);
	/// assert_eq!(exception.to_string(), "[410] Article removed");
	/// ```
	pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
			source: None,
		}
	}

	/// Create an exception whose message is the canonical reason phrase
	pub fn from_status(status: StatusCode) -> Self {
		Self::new(status, status.canonical_reason().unwrap_or("Unknown Status"))
	}

	/// 404 Not Found, raised when no route matches the request
	pub fn not_found() -> Self {
		Self::from_status(StatusCode::NOT_FOUND)
	}

	/// 500 Internal Server Error
	pub fn internal_server_error() -> Self {
		Self::from_status(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Attach the failure that caused this exception
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_exception::HttpException;
	///
	/// let io = std::io::Error::other("disk full");
	/// let exception = HttpException::internal_server_error().with_source(io);
	/// assert_eq!(format!("{exception:#}"), "[500] Internal Server Error\nCaused by: disk full");
	/// ```
	pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Status code of this exception
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Numeric status code of this exception
	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	/// Human readable message, also used as the response reason phrase
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl fmt::Debug for HttpException {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HttpException")
			.field("status", &self.status.as_u16())
			.field("message", &self.message)
			.field("source", &self.source)
			.finish()
	}
}

impl fmt::Display for HttpException {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.status.as_u16(), self.message)?;
		if f.alternate() {
			let mut cause = self.source.as_deref().map(|c| c as &(dyn StdError + 'static));
			while let Some(current) = cause {
				write!(f, "\nCaused by: {current}")?;
				cause = current.source();
			}
		}
		Ok(())
	}
}

impl StdError for HttpException {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.source
			.as_deref()
			.map(|cause| cause as &(dyn StdError + 'static))
	}
}
