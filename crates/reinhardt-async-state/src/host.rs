//! The seam to the UI framework that hosts components.
//!
//! The binding hook needs exactly two things from a framework: a state slot
//! per component instance that persists across re-renders, and a way to run
//! a side effect after the render is committed. [`Host`] is that seam; one
//! `Host` value stands for one component instance.

use std::cell::Cell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// Setter returned alongside a state slot's value.
///
/// Calling it replaces the slot value and schedules a re-render through the
/// host's own update mechanism.
pub type SetState<T> = Rc<dyn Fn(T)>;

/// A component instance as seen by the binding hook.
pub trait Host {
	/// Returns the slot's current value and its setter.
	///
	/// `initial` is used only the first time this slot is reached for the
	/// instance. Slots are identified by call order within a render.
	fn use_state<T: Clone + 'static>(&self, initial: T) -> (T, SetState<T>);

	/// Returns the instance's ran-once guard for the current hook.
	///
	/// Like [`use_state`](Host::use_state), the same guard is returned at the
	/// same call position on every render of the instance.
	fn use_once(&self) -> OnceGuard;

	/// Queues `effect` to start after the current render is committed.
	fn after_commit(&self, effect: LocalBoxFuture<'static, ()>);
}

/// Token that lets a side effect run at most once per component instance.
#[derive(Debug, Clone, Default)]
pub struct OnceGuard(Rc<Cell<bool>>);

impl OnceGuard {
	/// Creates an unclaimed guard.
	pub fn new() -> Self {
		Self::default()
	}

	/// Claims the guard. Returns `true` only for the first claim.
	pub fn claim(&self) -> bool {
		!self.0.replace(true)
	}

	/// Returns `true` if the guard was already claimed.
	pub fn is_claimed(&self) -> bool {
		self.0.get()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_once_guard_claims_once() {
		let guard = OnceGuard::new();
		assert!(!guard.is_claimed());
		assert!(guard.claim());
		assert!(!guard.claim());
		assert!(guard.is_claimed());
	}

	#[rstest]
	fn test_once_guard_clones_share_state() {
		let guard = OnceGuard::new();
		let alias = guard.clone();
		assert!(alias.claim());
		assert!(!guard.claim());
	}
}
