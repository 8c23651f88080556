//! Tri-state async results.
//!
//! An [`AsyncResult`] is what one execution of an async operation leaves
//! behind: the value (or the caller's default), an optional captured error,
//! and a `loading` flag that is only ever `true` on the client while a fetch
//! is in flight.

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Classification of a captured failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncErrorKind {
	/// The operation completed with an error value.
	Failed,
	/// The operation panicked while being polled.
	Panicked,
	/// The operation cannot run on this target (server mode on wasm32).
	Unsupported,
}

impl fmt::Display for AsyncErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Failed => f.write_str("failed"),
			Self::Panicked => f.write_str("panicked"),
			Self::Unsupported => f.write_str("unsupported"),
		}
	}
}

/// A failure captured from an async operation.
///
/// Serialized as `{"kind": "failed", "message": "..."}`; absence of an error
/// is represented by `None` on [`AsyncResult::error`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AsyncError {
	/// What kind of failure this was.
	pub kind: AsyncErrorKind,
	/// Human readable detail, taken from the failure's `Display`.
	pub message: String,
}

impl AsyncError {
	/// Creates a new error of the given kind.
	pub fn new(kind: AsyncErrorKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	/// Captures an operation failure.
	pub fn failed(error: impl fmt::Display) -> Self {
		Self::new(AsyncErrorKind::Failed, error.to_string())
	}

	/// Captures a panic payload as returned by `catch_unwind`.
	pub fn panicked(payload: Box<dyn Any + Send>) -> Self {
		let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
			(*s).to_string()
		} else if let Some(s) = payload.downcast_ref::<String>() {
			s.clone()
		} else {
			"async operation panicked".to_string()
		};
		Self::new(AsyncErrorKind::Panicked, message)
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl fmt::Display for AsyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind, self.message)
	}
}

impl std::error::Error for AsyncError {}

/// The state produced by one execution of an async operation.
///
/// Exactly one of `result` (on success) or `error` (on failure) carries the
/// outcome of a settled operation; on failure `result` holds the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncResult<T> {
	/// The resolved value, or the caller-supplied default.
	pub result: T,
	/// The captured failure, if any.
	pub error: Option<AsyncError>,
	/// `true` only while a client-side fetch is in flight.
	pub loading: bool,
}

impl<T> AsyncResult<T> {
	/// The state before a client-side fetch starts.
	pub fn idle(default: T) -> Self {
		Self {
			result: default,
			error: None,
			loading: false,
		}
	}

	/// The state while a client-side fetch is in flight.
	pub fn loading(default: T) -> Self {
		Self {
			result: default,
			error: None,
			loading: true,
		}
	}

	/// A settled success.
	pub fn success(value: T) -> Self {
		Self::idle(value)
	}

	/// A settled failure, falling back to `default`.
	pub fn failure(default: T, error: AsyncError) -> Self {
		Self {
			result: default,
			error: Some(error),
			loading: false,
		}
	}

	/// Builds the settled state for an operation outcome.
	pub fn from_outcome<E: fmt::Display>(outcome: Result<T, E>, default: T) -> Self {
		match outcome {
			Ok(value) => Self::success(value),
			Err(error) => Self::failure(default, AsyncError::failed(error)),
		}
	}

	/// Returns `true` when no fetch is in flight.
	///
	/// The idle state is indistinguishable from a success holding the default.
	pub fn is_settled(&self) -> bool {
		!self.loading
	}

	/// Returns `true` when a failure was captured.
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// Maps the result value, keeping error and loading flags.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AsyncResult<U> {
		AsyncResult {
			result: f(self.result),
			error: self.error,
			loading: self.loading,
		}
	}
}

impl<T: Serialize> AsyncResult<T> {
	/// Converts the result value into a JSON value for storage.
	pub fn to_value(&self) -> Result<AsyncResult<serde_json::Value>, serde_json::Error> {
		Ok(AsyncResult {
			result: serde_json::to_value(&self.result)?,
			error: self.error.clone(),
			loading: self.loading,
		})
	}
}

impl AsyncResult<serde_json::Value> {
	/// Converts a stored result back into a typed one.
	pub fn to_typed<T: DeserializeOwned>(&self) -> Result<AsyncResult<T>, serde_json::Error> {
		Ok(AsyncResult {
			result: T::deserialize(&self.result)?,
			error: self.error.clone(),
			loading: self.loading,
		})
	}
}
