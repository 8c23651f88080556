//! Reinhardt Async State - server-resolved async state for hydrated pages
//!
//! Components declare an async operation through [`Binding::use_async_state`].
//! During server-side rendering the operation is resolved synchronously and its
//! result is recorded by call position in a [`Store`]. The store travels to the
//! browser as a base64 token in the `data-state` attribute of `<body>`, and the
//! client's first render replays each recorded result instead of refetching.
//!
//! ## Architecture
//!
//! - [`result`]: [`AsyncResult`], the `{ result, error, loading }` triple
//! - [`store`]: the positional [`Store`] (component registry)
//! - [`codec`]: store entries to and from the embedded-state token
//! - [`config`]: the server-side wait [`PollStrategy`]
//! - `bridge`: the synchronous [`SyncBridge`] (native targets)
//! - [`document`]: reading and writing the token on `<body>`
//! - [`hydration`]: the one-shot [`HydrationLoader`]
//! - [`host`]: the [`Host`] seam to the UI framework
//! - [`hook`]: [`Binding`] and `use_async_state`
//! - `testing`: [`TestHost`], a reference host for tests (native targets)
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_async_state::{Binding, RenderMode, StaticDocument, create_and_bind};
//!
//! // Server render pass
//! let (_, server) = create_and_bind(RenderMode::Server);
//! let (greeting, _) = server.use_async_state(&host, None, fetch_greeting, None);
//! let html = server.render_body(&render(&greeting))?;
//!
//! // First client render pass
//! let client = Binding::client(StaticDocument::from_html(&html));
//! let (greeting, _) = client.use_async_state(&host, None, fetch_greeting, None);
//! assert!(greeting.is_settled()); // replayed, not refetched
//! ```
//!
//! Hooks are matched across the two passes purely by call order. Both passes
//! must call the hook the same number of times in the same order.

#![warn(missing_docs)]

pub mod logging;

pub mod codec;
pub mod config;
pub mod document;
pub mod hook;
pub mod host;
pub mod hydration;
pub mod result;
pub mod store;

#[cfg(not(target_arch = "wasm32"))]
pub mod bridge;

#[cfg(not(target_arch = "wasm32"))]
pub mod testing;

#[doc(hidden)]
pub use tracing as __tracing;

#[doc(hidden)]
#[cfg(target_arch = "wasm32")]
pub use web_sys as __web_sys;

pub use codec::MalformedTokenError;
pub use config::{AsyncStateConfig, ConfigError, DEFAULT_INTERVAL_MS, PollStrategy};
pub use document::{Document, STATE_ATTRIBUTE, StaticDocument, render_body, render_store_body};
pub use hook::{Binding, Updater, create_and_bind};
pub use host::{Host, OnceGuard, SetState};
pub use hydration::{HydrationLoader, HydrationOutcome};
pub use result::{AsyncError, AsyncErrorKind, AsyncResult};
pub use store::{Entries, RenderMode, Store, StoreRef, create_store};

#[cfg(target_arch = "wasm32")]
pub use document::WebDocument;

#[cfg(not(target_arch = "wasm32"))]
pub use bridge::SyncBridge;

#[cfg(not(target_arch = "wasm32"))]
pub use testing::TestHost;
