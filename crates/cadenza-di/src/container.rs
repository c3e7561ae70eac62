//! Named shared services

use crate::{DiError, DiResult};
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

enum Slot {
	Owned(Arc<dyn Any + Send + Sync>),
	Weak(Weak<dyn Any + Send + Sync>),
}

impl Slot {
	fn upgrade(&self) -> Option<Arc<dyn Any + Send + Sync>> {
		match self {
			Slot::Owned(service) => Some(Arc::clone(service)),
			Slot::Weak(service) => service.upgrade(),
		}
	}
}

/// Container of shared services addressed by name
///
/// Cloning is cheap and every clone sees the same services.
#[derive(Clone, Default)]
pub struct ServiceContainer {
	services: Arc<RwLock<HashMap<String, Slot>>>,
}

impl ServiceContainer {
	/// Creates an empty container.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a service under `name`, replacing any previous one.
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_di::ServiceContainer;
	/// use std::sync::Arc;
	///
	/// let container = ServiceContainer::new();
	/// container.register("answer", Arc::new(42u32));
	///
	/// assert_eq!(*container.get::<u32>("answer").unwrap(), 42);
	/// assert!(container.get::<String>("answer").is_none());
	/// ```
	pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, service: Arc<T>) {
		let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
		services.insert(name.into(), Slot::Owned(service));
	}

	/// Registers a service without keeping it alive.
	///
	/// Used for services that themselves own the container, where a strong
	/// reference would form a cycle. Once the service is dropped the name
	/// resolves to nothing.
	///
	/// # Examples
	///
	/// ```
	/// use cadenza_di::ServiceContainer;
	/// use std::sync::Arc;
	///
	/// let container = ServiceContainer::new();
	/// let app = Arc::new("app".to_string());
	/// container.register_weak("app", Arc::downgrade(&app));
	///
	/// assert!(container.get::<String>("app").is_some());
	/// drop(app);
	/// assert!(container.get::<String>("app").is_none());
	/// ```
	pub fn register_weak<T: Any + Send + Sync>(&self, name: impl Into<String>, service: Weak<T>) {
		let weak: Weak<dyn Any + Send + Sync> = service;
		let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
		services.insert(name.into(), Slot::Weak(weak));
	}

	/// Returns the service under `name` if it exists, is alive and has type `T`.
	pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
		self.require(name).ok()
	}

	/// Like [`ServiceContainer::get`] but explains why the lookup failed.
	pub fn require<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
		let service = {
			let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
			services.get(name).and_then(Slot::upgrade)
		}
		.ok_or_else(|| DiError::ServiceNotFound(name.to_string()))?;

		service.downcast::<T>().map_err(|_| DiError::TypeMismatch {
			name: name.to_string(),
			expected: type_name::<T>(),
		})
	}

	/// Whether a live service is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
		services
			.get(name)
			.is_some_and(|slot| slot.upgrade().is_some())
	}

	/// Removes the service under `name`, returning whether one was present.
	pub fn remove(&self, name: &str) -> bool {
		let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
		services.remove(name).is_some()
	}

	/// Names of all registered services, sorted.
	pub fn names(&self) -> Vec<String> {
		let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
		let mut names: Vec<String> = services.keys().cloned().collect();
		names.sort();
		names
	}
}

impl std::fmt::Debug for ServiceContainer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServiceContainer")
			.field("services", &self.names())
			.finish()
	}
}
