//! Logging macros shared by native and WASM builds
//!
//! Native builds emit `tracing` events under the `reinhardt_async_state`
//! target, so they reach whatever subscriber the server installed. WASM builds
//! write to the browser console in debug builds and compile to nothing in
//! release builds.
//!
//! | Macro | Native | WASM (debug builds) |
//! |-------|--------|---------------------|
//! | `debug_log!` | `tracing::debug!` (requires `debug-hooks`) | `console.debug` (requires `debug-hooks`) |
//! | `info_log!` | `tracing::info!` | `console.info` |
//! | `warn_log!` | `tracing::warn!` | `console.warn` |
//! | `error_log!` | `tracing::error!` | `console.error` |
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_async_state::{debug_log, warn_log};
//!
//! debug_log!("claimed position {}", position);
//! warn_log!("discarding malformed state token: {}", err);
//! ```

/// Emits one event at `$level` (`debug`, `info`, `warn` or `error`).
#[doc(hidden)]
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! __async_state_event {
	($level:ident, $($arg:tt)*) => {
		$crate::__tracing::$level!(target: "reinhardt_async_state", $($arg)*)
	};
}

#[doc(hidden)]
#[macro_export]
#[cfg(all(target_arch = "wasm32", debug_assertions))]
macro_rules! __async_state_event {
	(debug, $($arg:tt)*) => {
		$crate::__web_sys::console::debug_1(&format!($($arg)*).into())
	};
	(info, $($arg:tt)*) => {
		$crate::__web_sys::console::info_1(&format!($($arg)*).into())
	};
	(warn, $($arg:tt)*) => {
		$crate::__web_sys::console::warn_1(&format!($($arg)*).into())
	};
	(error, $($arg:tt)*) => {
		$crate::__web_sys::console::error_1(&format!($($arg)*).into())
	};
}

#[doc(hidden)]
#[macro_export]
#[cfg(all(target_arch = "wasm32", not(debug_assertions)))]
macro_rules! __async_state_event {
	($level:ident, $($arg:tt)*) => {{}};
}

/// Logs per-hook detail such as position claims and cache hits
///
/// Compiled out unless the `debug-hooks` feature is enabled.
#[macro_export]
#[cfg(feature = "debug-hooks")]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__async_state_event!(debug, $($arg)*);
	}};
}

/// No-op without the `debug-hooks` feature
#[macro_export]
#[cfg(not(feature = "debug-hooks"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message
#[macro_export]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__async_state_event!(info, $($arg)*);
	}};
}

/// Logs a warning
#[macro_export]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__async_state_event!(warn, $($arg)*);
	}};
}

/// Logs an error
#[macro_export]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__async_state_event!(error, $($arg)*);
	}};
}
