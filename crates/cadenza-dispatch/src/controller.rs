//! Controllers and their optional lifecycle hooks
//!
//! A controller is instantiated per request from a factory registered under a
//! stable identifier, the `_class` entry of the route context. The dispatcher
//! then runs:
//!
//! 1. the [`PreHook`], if the controller exposes one;
//! 2. the method named by `_method`, only while the working response status is in `[200, 300)`;
//! 3. the [`PostHook`], if the controller exposes one.
//!
//! A hook returning `Some(response)` replaces the working response, which is how
//! a pre-hook short-circuits the main method (redirects, 401, ...).
//!
//! ```
//! use async_trait::async_trait;
//! use cadenza_dispatch::{Controller, Outcome, PreHook};
//! use cadenza_http::{Error, Request, Response, Result};
//!
//! struct Dashboard;
//!
//! #[async_trait]
//! impl Controller for Dashboard {
//!     async fn invoke(&self, method: &str, _request: &Request, _response: &Response) -> Result<Outcome> {
//!         match method {
//!             "show" => Ok("welcome back".into()),
//!             other => Err(Error::UnknownMethod(other.to_string())),
//!         }
//!     }
//!
//!     fn pre_hook(&self) -> Option<&dyn PreHook> {
//!         Some(self)
//!     }
//! }
//!
//! #[async_trait]
//! impl PreHook for Dashboard {
//!     async fn pre(&self, request: &Request, _response: &Response) -> Result<Option<Response>> {
//!         if request.header("authorization").is_none() {
//!             return Ok(Some(Response::temporary_redirect("/login")));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

use crate::{Outcome, RequestContext};
use async_trait::async_trait;
use cadenza_di::{FactoryRegistry, ServiceContainer};
use cadenza_http::{Request, Response, Result};

/// A unit exposing the methods routes dispatch to
#[async_trait]
pub trait Controller: Send + Sync {
	/// Run the method named `method`
	///
	/// Unknown names should be reported with
	/// [`Error::UnknownMethod`](cadenza_http::Error::UnknownMethod).
	async fn invoke(&self, method: &str, request: &Request, response: &Response)
	-> Result<Outcome>;

	/// Hook run before the main method
	fn pre_hook(&self) -> Option<&dyn PreHook> {
		None
	}

	/// Hook run after the main method
	fn post_hook(&self) -> Option<&dyn PostHook> {
		None
	}
}

/// Runs before the main controller method
#[async_trait]
pub trait PreHook: Send + Sync {
	async fn pre(&self, request: &Request, response: &Response) -> Result<Option<Response>>;
}

/// Runs after the main controller method, or after the pre-hook when it short-circuited
#[async_trait]
pub trait PostHook: Send + Sync {
	async fn post(&self, request: &Request, response: &Response) -> Result<Option<Response>>;
}

/// What a controller factory can see
#[derive(Debug, Clone)]
pub struct ControllerContext {
	pub request: Request,
	/// The fresh, empty `200 OK` response the pipeline starts from
	pub response: Response,
	pub context: RequestContext,
	pub services: ServiceContainer,
}

/// Controller factories keyed by the `_class` route entry
pub type ControllerRegistry = FactoryRegistry<dyn Controller, ControllerContext>;
