//! # Cadenza URLs
//!
//! The contract between the dispatcher and URL routing.
//!
//! A [`Router`] turns a request into an optional [`Route`]. The route's context
//! names the dispatch target (`_class` and `_method`) and may request a locale
//! (`_locale`). [`SimpleRouter`] is a small exact-path implementation suitable
//! for tests and tiny applications; real applications plug in their own.

mod route;
mod router;

pub use route::{CONTROLLER_KEY, LOCALE_KEY, METHOD_KEY, Route};
pub use router::{Router, SimpleRouter};
