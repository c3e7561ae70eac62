use bytes::Bytes;
use cadenza_exception::{Error, Result};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode, Version};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, Write};

/// HTTP Response representation
///
/// Every `with_*` method consumes the response and returns the updated value,
/// leaving unrelated fields as they were.
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	reason: Option<String>,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	/// use http::StatusCode;
	///
	/// let response = Response::new(StatusCode::ACCEPTED);
	/// assert_eq!(response.status, StatusCode::ACCEPTED);
	/// assert_eq!(response.reason_phrase(), "Accepted");
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			reason: None,
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 401 Unauthorized status
	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	/// Create a Response with HTTP 403 Forbidden status
	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Create a Response with HTTP 302 Found (temporary redirect)
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	/// use http::StatusCode;
	///
	/// let response = Response::temporary_redirect("/login");
	/// assert_eq!(response.status, StatusCode::FOUND);
	/// assert_eq!(response.headers.get("location").unwrap(), "/login");
	/// ```
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_header("location", location.as_ref())
	}

	/// Create an HTML response with the given status
	pub fn html(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self::new(status)
			.with_typed_header(
				http::header::CONTENT_TYPE,
				HeaderValue::from_static("text/html; charset=utf-8"),
			)
			.with_body(body)
	}

	/// Replace the status code
	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	/// Set a custom reason phrase
	///
	/// The phrase is cut at the first control character so it cannot break out
	/// of the status line. An empty phrase falls back to the canonical one.
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	///
	/// let response = Response::not_found().with_reason("No Such Article");
	/// assert_eq!(response.reason_phrase(), "No Such Article");
	/// ```
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		let mut reason = reason.into();
		if let Some(end) = reason.find(char::is_control) {
			reason.truncate(end);
		}
		self.reason = (!reason.is_empty()).then_some(reason);
		self
	}

	/// Set the response body
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	/// use bytes::Bytes;
	///
	/// let response = Response::ok().with_body("Hello, World!");
	/// assert_eq!(response.body, Bytes::from("Hello, World!"));
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header, replacing any existing values; invalid names or values are ignored
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Append a header value, keeping existing values for the same name
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	///
	/// let response = Response::ok()
	///     .with_added_header("vary", "accept")
	///     .with_added_header("vary", "cookie");
	/// assert_eq!(response.headers.get_all("vary").iter().count(), 2);
	/// ```
	pub fn with_added_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.append(header_name, header_value);
		}
		self
	}

	/// Set a header using typed HeaderName and HeaderValue
	pub fn with_typed_header(mut self, key: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(key, value);
		self
	}

	/// Set the response body to JSON and add the matching Content-Type header
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	/// use serde_json::json;
	///
	/// let response = Response::ok().with_json(&json!({"id": 1})).unwrap();
	/// assert_eq!(response.headers.get("content-type").unwrap(), "application/json");
	/// assert_eq!(response.body_text(), r#"{"id":1}"#);
	/// ```
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
		let json = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
		self.body = Bytes::from(json);
		self.headers.insert(
			http::header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// Reason phrase: the custom one if set, otherwise the canonical phrase
	pub fn reason_phrase(&self) -> &str {
		self.reason
			.as_deref()
			.or_else(|| self.status.canonical_reason())
			.unwrap_or("")
	}

	/// Whether the status lies in `[200, 300)`
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Body decoded as UTF-8, replacing invalid sequences
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Write the response in HTTP/1.x wire form: status line, headers, blank line, body
	///
	/// Headers with several values are written once per value.
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Response;
	///
	/// let mut out = Vec::new();
	/// Response::ok()
	///     .with_header("x-app", "cadenza")
	///     .with_body("hi")
	///     .write_to(&mut out)
	///     .unwrap();
	///
	/// assert_eq!(out, b"HTTP/1.1 200 OK\r\nx-app: cadenza\r\n\r\nhi");
	/// ```
	pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
		write!(
			out,
			"{:?} {} {}\r\n",
			self.version,
			self.status.as_u16(),
			self.reason_phrase()
		)?;
		for (name, value) in &self.headers {
			out.write_all(name.as_str().as_bytes())?;
			out.write_all(b": ")?;
			out.write_all(value.as_bytes())?;
			out.write_all(b"\r\n")?;
		}
		out.write_all(b"\r\n")?;
		out.write_all(&self.body)?;
		out.flush()
	}
}

impl Default for Response {
	fn default() -> Self {
		Self::ok()
	}
}
