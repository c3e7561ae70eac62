use bytes::Bytes;
use cadenza_exception::{Error, HttpException, Result};
use http::{HeaderMap, Method, StatusCode, Uri, Version};
use indexmap::IndexMap;
use serde_json::Value;

/// Attribute carrying the locale a request should be served in
pub const LOCALE_ATTRIBUTE: &str = "_locale";

/// HTTP Request representation
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	attributes: IndexMap<String, Value>,
}

impl Request {
	/// Start building a request
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Request;
	/// use http::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/articles?draft=1")
	///     .body("title=Hello")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.method, Method::POST);
	/// assert_eq!(request.path(), "/articles");
	/// assert_eq!(request.query(), Some("draft=1"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// Path component of the request URI
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Query string of the request URI, if any
	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	/// Look up an attribute by name
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_http::Request;
	/// use serde_json::json;
	///
	/// let request = Request::builder()
	///     .uri("/")
	///     .attribute("_locale", json!("fr_FR"))
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.attribute("_locale"), Some(&json!("fr_FR")));
	/// assert_eq!(request.attribute("missing"), None);
	/// ```
	pub fn attribute(&self, name: &str) -> Option<&Value> {
		self.attributes.get(name)
	}

	/// All attributes, in insertion order
	pub fn attributes(&self) -> &IndexMap<String, Value> {
		&self.attributes
	}

	/// Locale requested through the `_locale` attribute
	///
	/// Only non-empty string values count.
	pub fn locale(&self) -> Option<&str> {
		self.attribute(LOCALE_ATTRIBUTE)
			.and_then(Value::as_str)
			.filter(|locale| !locale.is_empty())
	}

	/// Return a copy of this request with one more attribute
	pub fn with_attribute(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		let mut request = self.clone();
		request.attributes.insert(name.into(), value.into());
		request
	}

	/// Value of a header as a string, if present and valid UTF-8
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}
}

/// Builder for [`Request`]
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: String,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	attributes: IndexMap<String, Value>,
}

impl RequestBuilder {
	fn new() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			attributes: IndexMap::new(),
		}
	}

	/// Set the request method (defaults to GET)
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	/// Set the request URI (defaults to `/`)
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	/// Set the HTTP version (defaults to HTTP/1.1)
	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	/// Replace all headers
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add a single header; invalid names or values are ignored
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = http::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = http::header::HeaderValue::from_str(value)
		{
			self.headers.append(header_name, header_value);
		}
		self
	}

	/// Set the request body
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add an attribute
	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Build the request
	///
	/// Fails with a 400 exception when the URI cannot be parsed.
	pub fn build(self) -> Result<Request> {
		let uri = self.uri.parse::<Uri>().map_err(|e| {
			Error::Http(HttpException::new(
				StatusCode::BAD_REQUEST,
				format!("Invalid request URI '{}': {}", self.uri, e),
			))
		})?;

		Ok(Request {
			method: self.method,
			uri,
			version: self.version,
			headers: self.headers,
			body: self.body,
			attributes: self.attributes,
		})
	}
}
