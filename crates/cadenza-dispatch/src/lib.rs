//! # Cadenza Dispatch
//!
//! Request dispatching for the Cadenza framework.
//!
//! ## Overview
//!
//! The dispatcher handles:
//! - handing the request to the router and reading the dispatch target
//! - building the controller and running its lifecycle hooks
//! - turning every failure, panics included, into an error page
//!
//! ## Architecture
//!
//! ```text
//! Request → Router → Controller factory → pre-hook → method → post-hook → Response
//!             ↓             ↓                ↓          ↓          ↓
//!             └─────────────┴── HttpException ┴──────────┴──────────┘
//!                                     ↓
//!     configured handler → default handler → inline page → Response
//! ```
//!
//! The dispatcher shares a [`ServiceContainer`](cadenza_di::ServiceContainer)
//! with the application and registers itself and its collaborators there:
//!
//! | Service          | Type                           |
//! |------------------|--------------------------------|
//! | [`APP_SERVICE`]  | [`Dispatcher`] (weak)          |
//! | [`CONFIG_SERVICE`] | [`Settings`](cadenza_conf::Settings) |
//! | [`TEMPLATING_SERVICE`] | `Arc<dyn TemplateRenderer>` |
//!
//! ## Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use cadenza_dispatch::{Controller, Dispatcher, Outcome};
//! use cadenza_http::{Error, Request, Response, Result};
//! use cadenza_urls::{Route, SimpleRouter};
//! use http::StatusCode;
//!
//! struct Articles;
//!
//! #[async_trait]
//! impl Controller for Articles {
//!     async fn invoke(&self, method: &str, _request: &Request, _response: &Response) -> Result<Outcome> {
//!         match method {
//!             "list" => Ok(serde_json::json!(["first", "second"]).into()),
//!             other => Err(Error::UnknownMethod(other.to_string())),
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = Dispatcher::builder()
//!     .router(SimpleRouter::new().route(Route::to("/articles", "app.articles", "list")))
//!     .controller("app.articles", |_| Ok(Box::new(Articles) as Box<dyn Controller>))
//!     .build()
//!     .unwrap();
//!
//! let response = dispatcher
//!     .handle(Request::builder().uri("/articles").build().unwrap())
//!     .await;
//! assert_eq!(response.status, StatusCode::OK);
//! assert_eq!(response.body_text(), r#"["first","second"]"#);
//!
//! let response = dispatcher
//!     .handle(Request::builder().uri("/missing").build().unwrap())
//!     .await;
//! assert_eq!(response.status, StatusCode::NOT_FOUND);
//! # }
//! ```

mod builder;
pub mod controller;
mod context;
mod dispatcher;
pub mod error_handler;
mod guard;
mod outcome;
pub mod resolver;
pub mod timeline;

pub use builder::DispatcherBuilder;
pub use context::RequestContext;
pub use controller::{Controller, ControllerContext, ControllerRegistry, PostHook, PreHook};
pub use dispatcher::Dispatcher;
pub use error_handler::{
	DEFAULT_ERROR_HANDLER, DefaultErrorHandler, ErrorHandler, ErrorHandlerRegistry,
	default_error_handlers,
};
pub use outcome::Outcome;
pub use resolver::{ErrorHandlerResolver, FALLBACK_MESSAGE, fallback_page};
pub use timeline::{
	Activity, DEFAULT_ACTIVITY_LIMIT, MemoryTimeline, NoopTimeline, Timeline, TimelineError,
};

/// Service name the dispatcher registers itself under
pub const APP_SERVICE: &str = "app";

/// Service name of the shared [`Settings`](cadenza_conf::Settings)
pub const CONFIG_SERVICE: &str = "config";

/// Service name of the shared `Arc<dyn TemplateRenderer>`
pub const TEMPLATING_SERVICE: &str = "templating";

/// Response header carrying the request id in debug mode
pub const DEBUG_HEADER: &str = "x-cadenza-debug";
