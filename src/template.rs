//! Template rendering.

pub use cadenza_template::*;
