//! # Cadenza DI
//!
//! Explicit service wiring for Cadenza.
//!
//! There is no reflection and no auto-wiring: types are instantiated through
//! factories registered under stable string identifiers, and shared instances
//! live in a [`ServiceContainer`] under well-known names.
//!
//! - [`FactoryRegistry`]: identifier to factory mapping, resolved on demand with a
//!   caller supplied context.
//! - [`ServiceContainer`]: named, type-checked shared services.
//!
//! ## Example
//!
//! ```
//! use cadenza_di::{FactoryRegistry, ServiceContainer};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Polite(String);
//!
//! impl Greeter for Polite {
//!     fn greet(&self) -> String {
//!         format!("Good evening, {}", self.0)
//!     }
//! }
//!
//! let container = ServiceContainer::new();
//! container.register("site_name", Arc::new("Cadenza".to_string()));
//!
//! let mut greeters: FactoryRegistry<dyn Greeter, ServiceContainer> = FactoryRegistry::new();
//! greeters.register("polite", |services: &ServiceContainer| {
//!     let name = services.require::<String>("site_name")?;
//!     Ok(Box::new(Polite(name.to_string())) as Box<dyn Greeter>)
//! });
//!
//! let greeter = greeters.resolve("polite", &container).unwrap();
//! assert_eq!(greeter.greet(), "Good evening, Cadenza");
//! ```

mod container;
mod registry;

pub use container::ServiceContainer;
pub use registry::{BoxError, Factory, FactoryRegistry};

/// Errors raised while resolving services or factories
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DiError {
	/// No factory is registered under the identifier
	#[error("No factory registered for '{0}'")]
	NotRegistered(String),

	/// The factory ran but failed to produce an instance
	#[error("Factory '{id}' failed: {source}")]
	Factory {
		id: String,
		#[source]
		source: BoxError,
	},

	/// No service is registered under the name, or it has been dropped
	#[error("Service not found: {0}")]
	ServiceNotFound(String),

	/// A service exists under the name but has another type
	#[error("Service '{name}' is not a {expected}")]
	TypeMismatch { name: String, expected: &'static str },
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
