use indexmap::IndexMap;
use serde_json::Value;

/// Context key naming the controller identifier
pub const CONTROLLER_KEY: &str = "_class";
/// Context key naming the controller method
pub const METHOD_KEY: &str = "_method";
/// Context key carrying the locale the route should be served in
pub const LOCALE_KEY: &str = "_locale";

/// Result of matching a request
///
/// The context is a free-form map filled by the router. The dispatcher only
/// reads [`CONTROLLER_KEY`], [`METHOD_KEY`] and [`LOCALE_KEY`]; everything
/// else is left for controllers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
	pub path: String,
	pub name: Option<String>,
	context: IndexMap<String, Value>,
}

impl Route {
	/// Create a route with an empty context
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			name: None,
			context: IndexMap::new(),
		}
	}

	/// Create a route dispatching to `controller`'s `method`
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_urls::Route;
	///
	/// let route = Route::to("/articles", "app.articles", "index");
	/// assert_eq!(route.controller(), Some("app.articles"));
	/// assert_eq!(route.method(), Some("index"));
	/// assert_eq!(route.target(), Some(("app.articles", "index")));
	/// ```
	pub fn to(path: impl Into<String>, controller: &str, method: &str) -> Self {
		Self::new(path)
			.with_context(CONTROLLER_KEY, controller)
			.with_context(METHOD_KEY, method)
	}

	/// Set the route name
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Add a context entry
	pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.context.insert(key.into(), value.into());
		self
	}

	/// Serve this route in `locale`
	pub fn with_locale(self, locale: &str) -> Self {
		self.with_context(LOCALE_KEY, locale)
	}

	/// Full context map
	pub fn context(&self) -> &IndexMap<String, Value> {
		&self.context
	}

	/// Look up one context entry
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.context.get(key)
	}

	fn non_empty_str(&self, key: &str) -> Option<&str> {
		self.context
			.get(key)
			.and_then(Value::as_str)
			.filter(|value| !value.is_empty())
	}

	/// Controller identifier, when present as a non-empty string
	pub fn controller(&self) -> Option<&str> {
		self.non_empty_str(CONTROLLER_KEY)
	}

	/// Controller method, when present as a non-empty string
	pub fn method(&self) -> Option<&str> {
		self.non_empty_str(METHOD_KEY)
	}

	/// Locale requested by the route
	pub fn locale(&self) -> Option<&str> {
		self.non_empty_str(LOCALE_KEY)
	}

	/// The dispatch target; `None` unless both the controller and the method are set
	pub fn target(&self) -> Option<(&str, &str)> {
		Some((self.controller()?, self.method()?))
	}
}
