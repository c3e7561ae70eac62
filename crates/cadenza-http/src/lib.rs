//! # Cadenza HTTP
//!
//! Value types exchanged between the dispatcher, controllers and error handlers.
//!
//! - [`Request`]: an incoming request (method, URI, headers, body) with a string
//!   keyed attribute bag. Requests are never mutated once built; helpers such as
//!   [`Request::with_attribute`] return a new value.
//! - [`Response`]: status, reason phrase, headers and body. Every transformation
//!   consumes the response and returns the updated value, so a pipeline stage
//!   always rebinds its working response.
//! - [`Handler`]: anything that turns a request into a response.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::Handler;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export error types for consistency across the framework
pub use cadenza_exception::{Error, HttpException, Result};
