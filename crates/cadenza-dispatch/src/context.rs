use cadenza_http::Request;
use cadenza_urls::Route;
use uuid::Uuid;

/// Per-dispatch state handed to controller factories
///
/// Holds what would otherwise be process-wide: the locale the request should
/// be served in and whether debug output is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
	pub locale: Option<String>,
	pub debug: bool,
	/// Also sent back in the debug header
	pub request_id: Uuid,
}

impl RequestContext {
	/// Fresh context with a new request id
	pub fn new(debug: bool) -> Self {
		Self {
			locale: None,
			debug,
			request_id: Uuid::new_v4(),
		}
	}

	/// Pick the locale for a matched request
	///
	/// The request's `_locale` attribute wins over the route's.
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_dispatch::RequestContext;
	/// use cadenza_http::Request;
	/// use cadenza_urls::Route;
	///
	/// let route = Route::to("/", "home", "index").with_locale("en_GB");
	/// let plain = Request::builder().build().unwrap();
	/// let french = plain.with_attribute("_locale", "fr_FR");
	///
	/// let context = RequestContext::new(false).with_locale_from(&plain, &route);
	/// assert_eq!(context.locale.as_deref(), Some("en_GB"));
	///
	/// let context = RequestContext::new(false).with_locale_from(&french, &route);
	/// assert_eq!(context.locale.as_deref(), Some("fr_FR"));
	/// ```
	pub fn with_locale_from(mut self, request: &Request, route: &Route) -> Self {
		self.locale = request.locale().or_else(|| route.locale()).map(str::to_string);
		self
	}

	pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = Some(locale.into());
		self
	}
}

impl Default for RequestContext {
	fn default() -> Self {
		Self::new(false)
	}
}
