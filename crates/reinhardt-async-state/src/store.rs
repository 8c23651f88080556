//! Component registry for one render pass.
//!
//! A [`Store`] hands out positions to hook invocations in call order and
//! keeps the settled [`AsyncResult`] for each claimed position. The server
//! fills it while blocking on every operation; the client fills it once from
//! the embedded-state token.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::result::AsyncResult;
use crate::warn_log;

/// Settled results keyed by claimed position.
pub type Entries = BTreeMap<usize, AsyncResult<serde_json::Value>>;

/// A store shared between a [`Binding`](crate::Binding) and its caller.
pub type StoreRef = Rc<RefCell<Store>>;

/// Which side of the render a store belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
	/// Server-side render pass: operations are settled synchronously.
	Server,
	/// Client page load: operations are replayed from the token or fetched.
	Client,
}

impl RenderMode {
	/// Returns `true` for [`RenderMode::Server`].
	pub fn is_server(self) -> bool {
		matches!(self, Self::Server)
	}
}

/// Ordered, position-addressed registry of async results.
#[doc(alias = "ComponentRegistry")]
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
	position: usize,
	entries: Entries,
	mode: RenderMode,
}

impl Store {
	/// Creates an empty store at position 0.
	pub fn new(mode: RenderMode) -> Self {
		Self {
			position: 0,
			entries: Entries::new(),
			mode,
		}
	}

	/// Wraps the store for sharing with a binding.
	pub fn into_shared(self) -> StoreRef {
		Rc::new(RefCell::new(self))
	}

	/// The mode fixed at construction.
	pub fn mode(&self) -> RenderMode {
		self.mode
	}

	/// The next unclaimed position.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Returns the current position and advances past it.
	pub fn claim_position(&mut self) -> usize {
		let position = self.position;
		self.position += 1;
		position
	}

	/// Returns the settled entry for `position`, if any.
	pub fn get(&self, position: usize) -> Option<&AsyncResult<serde_json::Value>> {
		self.entries.get(&position)
	}

	/// Stores a settled entry, overwriting any previous one.
	///
	/// Returns `false` and leaves the store untouched when `result` is still
	/// loading.
	pub fn set(&mut self, position: usize, result: AsyncResult<serde_json::Value>) -> bool {
		if result.loading {
			warn_log!("refusing to store loading state at position {}", position);
			return false;
		}
		self.entries.insert(position, result);
		true
	}

	/// All settled entries.
	pub fn entries(&self) -> &Entries {
		&self.entries
	}

	/// Replaces all entries, as done when hydrating from a token.
	pub fn replace_entries(&mut self, entries: Entries) {
		self.entries = entries;
	}

	/// Number of settled entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if no entry has been stored.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Encodes the entries into an embedded-state token.
	pub fn encode(&self) -> Result<String, serde_json::Error> {
		codec::encode(&self.entries)
	}
}

/// Creates a fresh shared store for the given mode.
pub fn create_store(mode: RenderMode) -> StoreRef {
	Store::new(mode).into_shared()
}
