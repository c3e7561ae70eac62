//! Request and response types, the `Handler` trait and framework errors.

pub use cadenza_http::*;
