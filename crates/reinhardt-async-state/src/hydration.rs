//! Client-side hydration loader.
//!
//! On the first hook invocation of a page load the loader reads the
//! embedded-state token from the document, decodes it into the active store
//! and removes it. Later invocations never look at the document again.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::codec;
use crate::document::{Document, STATE_ATTRIBUTE};
use crate::store::Store;
use crate::{info_log, warn_log};

/// What happened when the loader ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
	/// The token was decoded; holds the number of restored entries.
	Restored(usize),
	/// The document carried no token.
	Absent,
	/// The token could not be decoded and was discarded.
	Malformed,
	/// The token was already consumed earlier in this page load.
	AlreadyConsumed,
}

/// One-shot loader for the embedded-state token.
pub struct HydrationLoader {
	document: RefCell<Box<dyn Document>>,
	consumed: Cell<bool>,
}

impl HydrationLoader {
	/// Creates a loader reading from `document`.
	pub fn new(document: impl Document + 'static) -> Self {
		Self {
			document: RefCell::new(Box::new(document)),
			consumed: Cell::new(false),
		}
	}

	/// Returns `true` once the token has been consumed.
	pub fn is_consumed(&self) -> bool {
		self.consumed.get()
	}

	/// Loads the token into `store` on the first call.
	///
	/// The token is removed from the document whether or not it decodes. A
	/// malformed token leaves `store` untouched so every position falls back
	/// to fetching.
	pub fn load_into(&self, store: &mut Store) -> HydrationOutcome {
		if self.consumed.replace(true) {
			return HydrationOutcome::AlreadyConsumed;
		}

		let mut document = self.document.borrow_mut();
		let Some(token) = document.body_attribute(STATE_ATTRIBUTE) else {
			return HydrationOutcome::Absent;
		};
		document.remove_body_attribute(STATE_ATTRIBUTE);

		match codec::decode(&token) {
			Ok(entries) => {
				let count = entries.len();
				store.replace_entries(entries);
				info_log!("hydrated {} async state entries", count);
				HydrationOutcome::Restored(count)
			}
			Err(e) => {
				warn_log!("discarding malformed state token: {}", e);
				HydrationOutcome::Malformed
			}
		}
	}
}

impl fmt::Debug for HydrationLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HydrationLoader")
			.field("consumed", &self.consumed.get())
			.finish_non_exhaustive()
	}
}
