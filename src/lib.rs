//! # Cadenza
//!
//! Request dispatch core for a controller-based web framework.
//!
//! A [`Dispatcher`] takes a [`Request`], asks a [`Router`] for the matching
//! [`Route`], builds the controller named by the route and runs its lifecycle.
//! Whatever goes wrong along the way, errors and panics alike, ends in an error
//! page chosen from the `errors.*` settings, so every request gets exactly one
//! [`Response`].
//!
//! ## Crates
//!
//! | Module | Crate | Contents |
//! |---|---|---|
//! | [`http`] | `cadenza-http` | `Request`, `Response`, `Handler`, `Error`, `HttpException` |
//! | [`conf`] | `cadenza-conf` | layered `Settings` from defaults, files and the environment |
//! | [`di`] | `cadenza-di` | `FactoryRegistry`, `ServiceContainer` |
//! | [`template`] | `cadenza-template` | `TemplateRenderer`, `TeraRenderer` |
//! | [`urls`] | `cadenza-urls` | `Route`, `Router`, `SimpleRouter` |
//! | [`dispatch`] | `cadenza-dispatch` | `Dispatcher`, controllers, error handlers |
//!
//! ## Quick Example
//!
//! ```rust
//! use cadenza::prelude::*;
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Controller for Greeter {
//!     async fn invoke(&self, method: &str, request: &Request, _response: &Response) -> Result<Outcome> {
//!         match method {
//!             "hello" => Ok(format!("Hello from {}", request.path()).into()),
//!             other => Err(Error::UnknownMethod(other.to_string())),
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = Dispatcher::builder()
//!     .router(SimpleRouter::new().route(Route::to("/hello", "app.greeter", "hello")))
//!     .controller("app.greeter", |_| Ok(Box::new(Greeter) as Box<dyn Controller>))
//!     .build()
//!     .unwrap();
//!
//! let response = dispatcher.handle(Request::builder().uri("/hello").build().unwrap()).await;
//! assert_eq!(response.body_text(), "Hello from /hello");
//!
//! let mut out = Vec::new();
//! dispatcher.print_response(&response, &mut out).unwrap();
//! assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! # }
//! ```
//!
//! ## Settings
//!
//! | Key | Meaning |
//! |---|---|
//! | `debug` | boolean; shows exception details and adds the debug header |
//! | `errors.<status>` | error handler identifier for one status |
//! | `errors.default` | error handler identifier for every other status |

pub mod conf;
pub mod di;
pub mod dispatch;
pub mod http;
pub mod template;
pub mod urls;

pub use cadenza_conf::{Settings, SettingsBuilder};
pub use cadenza_di::ServiceContainer;
pub use cadenza_dispatch::{
	Controller, ControllerContext, DefaultErrorHandler, Dispatcher, DispatcherBuilder,
	ErrorHandler, Outcome, PostHook, PreHook, RequestContext,
};
pub use cadenza_http::{Error, Handler, HttpException, Request, Response, Result};
pub use cadenza_template::{TemplateRenderer, TeraRenderer};
pub use cadenza_urls::{Route, Router, SimpleRouter};

/// Prelude module for convenient imports
///
/// Import everything commonly needed with:
/// ```rust
/// use cadenza::prelude::*;
/// ```
pub mod prelude {
	pub use crate::{
		Controller, ControllerContext, Dispatcher, Error, ErrorHandler, HttpException, Outcome,
		PostHook, PreHook, Request, Response, Result, Route, Router, Settings, SettingsBuilder,
		SimpleRouter,
	};

	pub use async_trait::async_trait;
}
