//! Request dispatching, controllers and error handlers.

pub use cadenza_dispatch::*;
