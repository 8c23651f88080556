//! # Reinhardt Prefetch
//!
//! Server-resolved async state for server-rendered, client-hydrated pages.
//!
//! A component asks for an async value once with `use_async_state`. On the
//! server the value is resolved before the markup is produced, so the HTML
//! already contains it. The resolved values ride along in the page as a single
//! `data-state` attribute, and the browser's first render picks them up by
//! position instead of fetching them a second time.
//!
//! ## Feature Flags
//!
//! - `debug-hooks` - Log position claims and cache hits at debug level
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use reinhardt_prefetch::prelude::*;
//!
//! async fn fetch_greeting() -> Result<Option<String>, String> {
//!     Ok(Some("hello".to_string()))
//! }
//!
//! let binding = Binding::server();
//! let (greeting, _) = binding.use_async_state(&host, None, fetch_greeting, None);
//! let html = binding.render_body(&format!("<p>{:?}</p>", greeting.result))?;
//! ```

pub mod async_state;

/// Commonly used items.
pub mod prelude {
	pub use crate::async_state::{
		AsyncError, AsyncErrorKind, AsyncResult, AsyncStateConfig, Binding, Document, Host,
		PollStrategy, RenderMode, StaticDocument, Updater, create_and_bind,
	};

	#[cfg(target_arch = "wasm32")]
	pub use crate::async_state::WebDocument;

	#[cfg(not(target_arch = "wasm32"))]
	pub use crate::async_state::SyncBridge;
}
