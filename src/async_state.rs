//! Positional async state with SSR hydration
//!
//! This module provides access to reinhardt-async-state.
//!
//! ## Architecture
//!
//! - **Store**: results recorded by hook call position
//! - **Sync Bridge**: server renders settle async operations before returning
//! - **Hydration**: the client's first render replays the server's results
//! - **Host seam**: any hook-based UI framework supplies state slots and effects
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_prefetch::async_state::{Binding, StaticDocument};
//!
//! let client = Binding::client(StaticDocument::from_html(&server_html));
//! let (greeting, set_greeting) = client.use_async_state(&host, None, fetch_greeting, None);
//! ```

// Re-export all reinhardt-async-state functionality
pub use reinhardt_async_state::*;
