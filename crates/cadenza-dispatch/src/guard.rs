//! Stage boundaries: panics and container failures become [`Error`]s.

use cadenza_di::DiError;
use cadenza_http::{Error, HttpException, Result};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Await `future`, turning a panic into [`Error::Panic`]
pub(crate) async fn catch_panic<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
	AssertUnwindSafe(future)
		.catch_unwind()
		.await
		.unwrap_or_else(|payload| Err(Error::from_panic(payload)))
}

/// Run `f`, turning a panic into [`Error::Panic`]
pub(crate) fn catch_panic_sync<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
	std::panic::catch_unwind(AssertUnwindSafe(f))
		.unwrap_or_else(|payload| Err(Error::from_panic(payload)))
}

/// Map a container failure to a framework error
///
/// A factory that failed with a framework error or an [`HttpException`] keeps it,
/// so a factory can reject a request with a precise status.
pub(crate) fn container_error(error: DiError) -> Error {
	match error {
		DiError::Factory { id, source } => {
			let source = match source.downcast::<Error>() {
				Ok(error) => return *error,
				Err(source) => source,
			};
			match source.downcast::<HttpException>() {
				Ok(exception) => Error::Http(*exception),
				Err(source) => Error::Container(format!("Factory '{id}' failed: {source}")),
			}
		}
		other => Error::Container(other.to_string()),
	}
}
