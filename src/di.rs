//! Factory registries and the named service container.

pub use cadenza_di::*;
