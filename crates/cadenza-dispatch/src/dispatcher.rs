use crate::controller::{ControllerContext, ControllerRegistry};
use crate::guard::{catch_panic, catch_panic_sync, container_error};
use crate::resolver::ErrorHandlerResolver;
use crate::timeline::{Activity, FRAMEWORK_GROUP, Timeline};
use crate::{DEBUG_HEADER, DispatcherBuilder, RequestContext};
use async_trait::async_trait;
use cadenza_conf::Settings;
use cadenza_di::ServiceContainer;
use cadenza_http::{Error, Handler, HttpException, Request, Response, Result};
use cadenza_urls::{Route, Router};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes a request to a controller and always produces a response
///
/// Built with [`DispatcherBuilder`]. The pipeline for one request is:
///
/// 1. ask the router for a route; no route is a 404;
/// 2. a route without both `_class` and `_method` is a 500;
/// 3. build the controller and run its pre-hook, main method and post-hook;
/// 4. any failure or panic is wrapped into an [`HttpException`] (500 unless it
///    already is one) and handed to the [`ErrorHandlerResolver`].
///
/// In debug mode the final response also carries the [`DEBUG_HEADER`].
pub struct Dispatcher {
	pub(crate) router: Arc<dyn Router>,
	pub(crate) controllers: ControllerRegistry,
	pub(crate) resolver: ErrorHandlerResolver,
	pub(crate) settings: Arc<Settings>,
	pub(crate) services: ServiceContainer,
	pub(crate) timeline: Arc<dyn Timeline>,
}

impl Dispatcher {
	pub fn builder() -> DispatcherBuilder {
		DispatcherBuilder::new()
	}

	/// Handle one request
	///
	/// Never fails: every failure becomes an error response.
	pub async fn handle(&self, request: Request) -> Response {
		let debug = self.settings.debug().unwrap_or_else(|e| {
			warn!(error = %e, "unreadable debug flag, assuming debug is off");
			false
		});
		let context = RequestContext::new(debug);
		let request_id = context.request_id;

		let response = match self.run(&request, context).await {
			Ok(response) => response,
			Err(error) => {
				let exception = HttpException::from(error);
				debug!(
					status = exception.status_code(),
					path = request.path(),
					"request failed, resolving error handler"
				);
				self.resolver.resolve(&request, &exception).await
			}
		};

		if debug {
			response.with_added_header(DEBUG_HEADER, &request_id.to_string())
		} else {
			response
		}
	}

	async fn run(&self, request: &Request, context: RequestContext) -> Result<Response> {
		let activity = Activity::start("Router (handle)", Some(FRAMEWORK_GROUP));
		let matched = catch_panic(self.router.match_request(request)).await;
		self.record(activity.end());

		let route = matched?.ok_or_else(HttpException::not_found)?;
		let Some((controller_id, method)) = route.target() else {
			warn!(path = %route.path, "route has no dispatch target");
			return Err(HttpException::internal_server_error().into());
		};
		let context = context.with_locale_from(request, &route);

		let activity = Activity::start("Controller", None);
		let result = catch_panic(self.run_controller(request, &route, controller_id, method, context)).await;
		self.record(activity.end());
		result
	}

	async fn run_controller(
		&self,
		request: &Request,
		route: &Route,
		controller_id: &str,
		method: &str,
		context: RequestContext,
	) -> Result<Response> {
		debug!(
			controller = controller_id,
			method,
			route = ?route.name,
			locale = ?context.locale,
			"dispatching to controller"
		);

		let controller_context = ControllerContext {
			request: request.clone(),
			response: Response::ok(),
			context,
			services: self.services.clone(),
		};
		let controller = catch_panic_sync(|| {
			self.controllers
				.resolve(controller_id, &controller_context)
				.map_err(container_error)
		})?;
		let mut response = controller_context.response;

		if let Some(hook) = controller.pre_hook()
			&& let Some(replacement) = hook.pre(request, &response).await?
		{
			response = replacement;
		}

		if response.is_success() {
			let outcome = controller.invoke(method, request, &response).await?;
			response = outcome.apply(response)?;
		} else {
			debug!(status = response.status.as_u16(), "pre-hook short-circuited the controller");
		}

		if let Some(hook) = controller.post_hook()
			&& let Some(replacement) = hook.post(request, &response).await?
		{
			response = replacement;
		}

		Ok(response)
	}

	/// Write `response` to `out` in HTTP/1.x form
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_dispatch::Dispatcher;
	/// use cadenza_http::Response;
	/// use cadenza_urls::SimpleRouter;
	///
	/// let dispatcher = Dispatcher::builder().router(SimpleRouter::new()).build().unwrap();
	///
	/// let mut out = Vec::new();
	/// dispatcher
	///     .print_response(&Response::ok().with_body("done"), &mut out)
	///     .unwrap();
	/// assert_eq!(out, b"HTTP/1.1 200 OK\r\n\r\ndone");
	/// ```
	pub fn print_response<W: Write + ?Sized>(&self, response: &Response, out: &mut W) -> io::Result<()> {
		let activity = Activity::start("Print response", Some(FRAMEWORK_GROUP));
		let result = response.write_to(out);
		self.record(activity.end());
		result
	}

	/// Hand `activity` to the timeline; neither a refusal nor a panic reaches the caller
	fn record(&self, activity: Activity) {
		let recorded = catch_panic_sync(|| {
			self.timeline
				.record(activity)
				.map_err(|e| Error::Internal(e.to_string()))
		});
		if let Err(e) = recorded {
			warn!(error = %e, "failed to record activity");
		}
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn services(&self) -> &ServiceContainer {
		&self.services
	}

	pub fn controllers(&self) -> &ControllerRegistry {
		&self.controllers
	}

	pub fn resolver(&self) -> &ErrorHandlerResolver {
		&self.resolver
	}
}

#[async_trait]
impl Handler for Dispatcher {
	async fn handle(&self, request: Request) -> Result<Response> {
		Ok(Dispatcher::handle(self, request).await)
	}
}

impl std::fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dispatcher")
			.field("controllers", &self.controllers)
			.field("error_handlers", self.resolver.handlers())
			.field("services", &self.services)
			.finish_non_exhaustive()
	}
}
