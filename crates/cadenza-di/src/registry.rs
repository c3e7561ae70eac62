//! Identifier-keyed factories

use crate::DiError;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Boxed error a factory may fail with
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Factory producing a boxed `T` from a context `C`
pub type Factory<T, C> = Arc<dyn Fn(&C) -> Result<Box<T>, BoxError> + Send + Sync>;

/// Mapping from stable identifiers to factories
///
/// Replaces lookup of types by name: every instantiable type is registered
/// up front and resolved by identifier at runtime. Identifiers keep their
/// registration order.
pub struct FactoryRegistry<T: ?Sized, C> {
	factories: IndexMap<String, Factory<T, C>>,
}

impl<T: ?Sized, C> FactoryRegistry<T, C> {
	pub fn new() -> Self {
		Self {
			factories: IndexMap::new(),
		}
	}

	/// Register a factory, replacing any previous one with the same identifier
	pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
	where
		F: Fn(&C) -> Result<Box<T>, BoxError> + Send + Sync + 'static,
	{
		let id = id.into();
		if self.factories.insert(id.clone(), Arc::new(factory)).is_some() {
			tracing::debug!(id = %id, "replacing registered factory");
		}
		self
	}

	/// Builder-style variant of [`FactoryRegistry::register`]
	pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Self
	where
		F: Fn(&C) -> Result<Box<T>, BoxError> + Send + Sync + 'static,
	{
		self.register(id, factory);
		self
	}

	/// Whether a factory is registered under `id`
	pub fn contains(&self, id: &str) -> bool {
		self.factories.contains_key(id)
	}

	/// Registered identifiers, in registration order
	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.factories.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.factories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}

	/// Instantiate the type registered under `id`
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_di::{DiError, FactoryRegistry};
	///
	/// let mut registry: FactoryRegistry<str, ()> = FactoryRegistry::new();
	/// registry.register("motto", |_: &()| Ok("ad astra".into()));
	///
	/// assert_eq!(&*registry.resolve("motto", &()).unwrap(), "ad astra");
	/// assert!(matches!(
	///     registry.resolve("other", &()),
	///     Err(DiError::NotRegistered(id)) if id == "other"
	/// ));
	/// ```
	pub fn resolve(&self, id: &str, context: &C) -> Result<Box<T>, DiError> {
		let factory = self
			.factories
			.get(id)
			.ok_or_else(|| DiError::NotRegistered(id.to_string()))?;

		factory(context).map_err(|source| DiError::Factory {
			id: id.to_string(),
			source,
		})
	}
}

impl<T: ?Sized, C> Default for FactoryRegistry<T, C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: ?Sized, C> Clone for FactoryRegistry<T, C> {
	fn clone(&self) -> Self {
		Self {
			factories: self.factories.clone(),
		}
	}
}

impl<T: ?Sized, C> fmt::Debug for FactoryRegistry<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FactoryRegistry")
			.field("ids", &self.factories.keys().collect::<Vec<_>>())
			.finish()
	}
}
