use crate::Route;
use async_trait::async_trait;
use cadenza_http::{Request, Result};
use http::Method;
use std::sync::Arc;

/// Matches requests to routes
///
/// `Ok(None)` means nothing matched; the dispatcher turns it into a 404.
/// An `Err` is a router failure and is reported like any other failure.
#[async_trait]
pub trait Router: Send + Sync {
	async fn match_request(&self, request: &Request) -> Result<Option<Route>>;
}

#[async_trait]
impl<T: Router + ?Sized> Router for Arc<T> {
	async fn match_request(&self, request: &Request) -> Result<Option<Route>> {
		(**self).match_request(request).await
	}
}

/// Router matching the request path exactly
///
/// Routes are tried in registration order; a route registered for a method
/// only matches requests with that method.
///
/// # Examples
///
/// ```
/// use cadenza_http::Request;
/// use cadenza_urls::{Route, Router, SimpleRouter};
/// use http::Method;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let router = SimpleRouter::new()
///     .route(Route::to("/articles", "app.articles", "index"))
///     .route_for(Method::POST, Route::to("/articles", "app.articles", "create"));
///
/// let get = Request::builder().uri("/articles").build().unwrap();
/// let post = Request::builder().method(Method::POST).uri("/articles").build().unwrap();
///
/// let matched = router.match_request(&get).await.unwrap().unwrap();
/// assert_eq!(matched.method(), Some("index"));
///
/// // Method-agnostic routes registered first win.
/// let matched = router.match_request(&post).await.unwrap().unwrap();
/// assert_eq!(matched.method(), Some("index"));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleRouter {
	routes: Vec<(Option<Method>, Route)>,
}

impl SimpleRouter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a route matching any method
	pub fn route(mut self, route: Route) -> Self {
		self.routes.push((None, route));
		self
	}

	/// Add a route matching only `method`
	pub fn route_for(mut self, method: Method, route: Route) -> Self {
		self.routes.push((Some(method), route));
		self
	}

	/// Registered routes, in order
	pub fn routes(&self) -> impl Iterator<Item = &Route> {
		self.routes.iter().map(|(_, route)| route)
	}
}

#[async_trait]
impl Router for SimpleRouter {
	async fn match_request(&self, request: &Request) -> Result<Option<Route>> {
		let path = request.path();
		let matched = self
			.routes
			.iter()
			.find(|(method, route)| {
				route.path == path && method.as_ref().is_none_or(|m| *m == request.method)
			})
			.map(|(_, route)| route.clone());

		match &matched {
			Some(route) => tracing::debug!(path, name = ?route.name, "route matched"),
			None => tracing::debug!(path, "no route matched"),
		}
		Ok(matched)
	}
}
