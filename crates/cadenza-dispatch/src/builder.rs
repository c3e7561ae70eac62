use crate::controller::{Controller, ControllerContext, ControllerRegistry};
use crate::error_handler::{ErrorHandler, ErrorHandlerRegistry, default_error_handlers};
use crate::resolver::ErrorHandlerResolver;
use crate::timeline::{NoopTimeline, Timeline};
use crate::{APP_SERVICE, CONFIG_SERVICE, Dispatcher, TEMPLATING_SERVICE};
use cadenza_conf::Settings;
use cadenza_di::{BoxError, ServiceContainer};
use cadenza_http::{Error, Result};
use cadenza_template::{TemplateRenderer, TeraRenderer};
use cadenza_urls::Router;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builder for [`Dispatcher`]
///
/// Only the router is required. Defaults: empty settings, a [`TeraRenderer`]
/// with the built-in templates, a fresh [`ServiceContainer`], no controllers,
/// the built-in error handler and a [`NoopTimeline`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use cadenza_dispatch::{Controller, Dispatcher, Outcome};
/// use cadenza_http::{Request, Response, Result};
/// use cadenza_urls::{Route, SimpleRouter};
///
/// struct Home;
///
/// #[async_trait]
/// impl Controller for Home {
///     async fn invoke(&self, _method: &str, _request: &Request, _response: &Response) -> Result<Outcome> {
///         Ok("home".into())
///     }
/// }
///
/// let dispatcher = Dispatcher::builder()
///     .router(SimpleRouter::new().route(Route::to("/", "app.home", "index")))
///     .controller("app.home", |_| Ok(Box::new(Home) as Box<dyn Controller>))
///     .build()
///     .unwrap();
///
/// assert!(dispatcher.controllers().contains("app.home"));
/// assert!(dispatcher.services().contains("app"));
/// ```
pub struct DispatcherBuilder {
	router: Option<Arc<dyn Router>>,
	settings: Settings,
	renderer: Option<Arc<dyn TemplateRenderer>>,
	services: ServiceContainer,
	controllers: ControllerRegistry,
	error_handlers: ErrorHandlerRegistry,
	timeline: Arc<dyn Timeline>,
}

impl DispatcherBuilder {
	pub fn new() -> Self {
		Self {
			router: None,
			settings: Settings::new(),
			renderer: None,
			services: ServiceContainer::new(),
			controllers: ControllerRegistry::new(),
			error_handlers: default_error_handlers(),
			timeline: Arc::new(NoopTimeline),
		}
	}

	pub fn router(self, router: impl Router + 'static) -> Self {
		self.shared_router(Arc::new(router))
	}

	pub fn shared_router(mut self, router: Arc<dyn Router>) -> Self {
		self.router = Some(router);
		self
	}

	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	pub fn renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
		self.renderer = Some(Arc::new(renderer));
		self
	}

	/// Share an existing container; the dispatcher adds its own services to it
	pub fn services(mut self, services: ServiceContainer) -> Self {
		self.services = services;
		self
	}

	pub fn timeline(mut self, timeline: Arc<dyn Timeline>) -> Self {
		self.timeline = timeline;
		self
	}

	/// Register a controller factory under the identifier routes use as `_class`
	pub fn controller<F>(mut self, id: impl Into<String>, factory: F) -> Self
	where
		F: Fn(&ControllerContext) -> std::result::Result<Box<dyn Controller>, BoxError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.controllers.register(id, factory);
		self
	}

	/// Register an error handler factory under the identifier `errors.*` settings use
	pub fn error_handler<F>(mut self, id: impl Into<String>, factory: F) -> Self
	where
		F: Fn(&ServiceContainer) -> std::result::Result<Box<dyn ErrorHandler>, BoxError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.error_handlers.register(id, factory);
		self
	}

	/// Validate the configuration and build the dispatcher
	///
	/// Fails with [`Error::ImproperlyConfigured`] when no router was given.
	/// Error handler identifiers found in the `errors` settings but not
	/// registered only produce a warning; the default handler replaces them
	/// at dispatch time.
	pub fn build(self) -> Result<Arc<Dispatcher>> {
		self.validate_error_handlers();
		if let Err(e) = self.settings.debug() {
			warn!(error = %e, "debug flag is not a boolean and will be treated as false");
		}

		let router = self
			.router
			.ok_or_else(|| Error::ImproperlyConfigured("a router is required".to_string()))?;
		let renderer = match self.renderer {
			Some(renderer) => renderer,
			None => Arc::new(TeraRenderer::new().map_err(|e| Error::Template(e.to_string()))?),
		};

		let settings = Arc::new(self.settings);
		let services = self.services;
		services.register(CONFIG_SERVICE, Arc::clone(&settings));
		services.register(TEMPLATING_SERVICE, Arc::new(Arc::clone(&renderer)));

		let resolver =
			ErrorHandlerResolver::new(Arc::clone(&settings), services.clone(), self.error_handlers, renderer);

		debug!(
			controllers = self.controllers.len(),
			error_handlers = resolver.handlers().len(),
			"dispatcher ready"
		);

		Ok(Arc::new_cyclic(|app| {
			services.register_weak(APP_SERVICE, app.clone());
			Dispatcher {
				router,
				controllers: self.controllers,
				resolver,
				settings,
				services,
				timeline: self.timeline,
			}
		}))
	}

	fn validate_error_handlers(&self) {
		for (key, value) in self.settings.section("errors") {
			match value.as_str() {
				Some(id) if self.error_handlers.contains(id) => {}
				Some(id) => warn!(
					setting = %format!("errors.{key}"),
					handler = id,
					"error handler is not registered, the default one will be used"
				),
				None => warn!(
					setting = %format!("errors.{key}"),
					"error handler setting is not a string, the default one will be used"
				),
			}
		}
	}
}

impl Default for DispatcherBuilder {
	fn default() -> Self {
		Self::new()
	}
}
