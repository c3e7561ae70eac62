//! Routes and routers.
//!
//! # Examples
//!
//! ```rust
//! use cadenza::urls::Route;
//!
//! let route = Route::to("/", "app.home", "index").with_locale("en_GB");
//! assert_eq!(route.target(), Some(("app.home", "index")));
//! ```

pub use cadenza_urls::*;
