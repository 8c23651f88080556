//! The binding hook: `use_async_state`.
//!
//! A [`Binding`] ties the hook to one [`Store`](crate::Store). Every call
//! claims the next position first, then:
//!
//! - **Server**: the operation is settled synchronously through the
//!   [`SyncBridge`](crate::SyncBridge), stored at the claimed position and
//!   returned. The updater is inert.
//! - **Client**: the embedded-state token is loaded into the store on the
//!   first call of the page load. A cached entry at the claimed position is
//!   returned without running the operation. Otherwise the state starts idle
//!   and a post-commit effect moves it to loading and then to the settled
//!   result, once per component instance.
//!
//! Positions are assigned by call order, so the server pass and the client's
//! first pass must invoke the hook in the same order for the same tree. Hooks
//! must not be called conditionally before the tree has settled on data that
//! both sides share.
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_async_state::{Binding, RenderMode, create_and_bind};
//!
//! // Server
//! let (store, binding) = create_and_bind(RenderMode::Server);
//! let (user, _) = binding.use_async_state(&host, None, || fetch_user(42), None);
//! let html = binding.render_body(&render_profile(&user))?;
//!
//! // Client
//! let binding = Binding::client(WebDocument::new());
//! let (user, _) = binding.use_async_state(&host, None, || fetch_user(42), None);
//! ```

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use futures::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::AsyncStateConfig;
use crate::document::{self, Document};
use crate::host::{Host, SetState};
use crate::hydration::HydrationLoader;
use crate::result::{AsyncError, AsyncResult};
use crate::store::{RenderMode, StoreRef, create_store};
use crate::{debug_log, error_log, warn_log};

/// Context object binding the hook to a store.
#[derive(Debug)]
pub struct Binding {
	store: StoreRef,
	hydration: Option<HydrationLoader>,
	config: AsyncStateConfig,
}

/// Creates a fresh store for `mode` and a binding over it.
///
/// Bindings created later use their own store; hooks already bound to this
/// one are unaffected.
pub fn create_and_bind(mode: RenderMode) -> (StoreRef, Binding) {
	let store = create_store(mode);
	let binding = Binding::bind(Rc::clone(&store));
	(store, binding)
}

impl Binding {
	/// Binds the hook to an existing store.
	pub fn bind(store: StoreRef) -> Self {
		Self {
			store,
			hydration: None,
			config: AsyncStateConfig::default(),
		}
	}

	/// A binding over a fresh server store.
	pub fn server() -> Self {
		Self::bind(create_store(RenderMode::Server))
	}

	/// A binding over a fresh client store, hydrating from `document`.
	pub fn client(document: impl Document + 'static) -> Self {
		Self::bind(create_store(RenderMode::Client)).with_document(document)
	}

	/// A client binding hydrating from the browser's document.
	#[cfg(target_arch = "wasm32")]
	pub fn from_window() -> Self {
		Self::client(document::WebDocument::new())
	}

	/// Sets the document the embedded-state token is read from.
	pub fn with_document(mut self, document: impl Document + 'static) -> Self {
		self.hydration = Some(HydrationLoader::new(document));
		self
	}

	/// Sets the configuration used when a call passes none.
	pub fn with_config(mut self, config: AsyncStateConfig) -> Self {
		self.config = config;
		self
	}

	/// The bound store.
	pub fn store(&self) -> &StoreRef {
		&self.store
	}

	/// The bound store's mode.
	pub fn mode(&self) -> RenderMode {
		self.store.borrow().mode()
	}

	/// The default configuration.
	pub fn config(&self) -> AsyncStateConfig {
		self.config
	}

	/// Encodes the bound store into an embedded-state token.
	pub fn encode_state(&self) -> Result<String, serde_json::Error> {
		self.store.borrow().encode()
	}

	/// Wraps server-rendered markup in a `<body>` carrying the store.
	pub fn render_body(&self, inner_html: &str) -> Result<String, serde_json::Error> {
		document::render_store_body(&self.store.borrow(), inner_html)
	}

	/// Runs `callback` once for this hook slot and returns its state.
	///
	/// `default` is the result while nothing has settled and after a failure.
	/// `config` overrides the binding's configuration for this call.
	pub fn use_async_state<H, T, E, F, Fut>(
		&self,
		host: &H,
		default: T,
		callback: F,
		config: Option<AsyncStateConfig>,
	) -> (AsyncResult<T>, Updater<T>)
	where
		H: Host,
		T: Serialize + DeserializeOwned + Clone + 'static,
		E: fmt::Display + 'static,
		F: FnOnce() -> Fut + 'static,
		Fut: Future<Output = Result<T, E>> + 'static,
	{
		let (mode, position) = {
			let mut store = self.store.borrow_mut();
			(store.mode(), store.claim_position())
		};
		debug_log!("claimed position {} ({:?})", position, mode);

		match mode {
			RenderMode::Server => {
				let config = config.unwrap_or(self.config);
				self.use_server(host, position, default, callback, config)
			}
			RenderMode::Client => self.use_client(host, position, default, callback),
		}
	}

	fn use_server<H, T, E, F, Fut>(
		&self,
		host: &H,
		position: usize,
		default: T,
		callback: F,
		config: AsyncStateConfig,
	) -> (AsyncResult<T>, Updater<T>)
	where
		H: Host,
		T: Serialize + Clone + 'static,
		E: fmt::Display,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		let settled = settle_on_server(config, default, callback);
		self.commit(position, &settled);

		let (state, _) = host.use_state(settled);
		// Nothing is scheduled on the server; claiming keeps the slot layout
		// identical to the client's.
		host.use_once().claim();
		(state, Updater::inert())
	}

	fn use_client<H, T, E, F, Fut>(
		&self,
		host: &H,
		position: usize,
		default: T,
		callback: F,
	) -> (AsyncResult<T>, Updater<T>)
	where
		H: Host,
		T: DeserializeOwned + Clone + 'static,
		E: fmt::Display + 'static,
		F: FnOnce() -> Fut + 'static,
		Fut: Future<Output = Result<T, E>> + 'static,
	{
		if let Some(loader) = &self.hydration {
			loader.load_into(&mut self.store.borrow_mut());
		}

		let cached = self.cached::<T>(position);
		let hit = cached.is_some();
		let initial = cached.unwrap_or_else(|| AsyncResult::idle(default.clone()));

		let (state, set_state) = host.use_state(initial);
		let guard = host.use_once();

		if hit {
			guard.claim();
			debug_log!("position {} served from hydrated state", position);
		} else if guard.claim() {
			host.after_commit(fetch(Rc::clone(&set_state), default, callback).boxed_local());
		}

		(state, Updater::new(set_state))
	}

	fn commit<T: Serialize>(&self, position: usize, settled: &AsyncResult<T>) {
		let stored = settled.to_value().unwrap_or_else(|e| {
			error_log!("result at position {} is not serializable: {}", position, e);
			AsyncResult::failure(
				serde_json::Value::Null,
				AsyncError::failed(format!("result is not serializable: {e}")),
			)
		});
		self.store.borrow_mut().set(position, stored);
	}

	fn cached<T: DeserializeOwned>(&self, position: usize) -> Option<AsyncResult<T>> {
		let store = self.store.borrow();
		let entry = store.get(position)?;
		match entry.to_typed() {
			Ok(state) => Some(state),
			Err(e) => {
				warn_log!("ignoring hydrated entry at position {}: {}", position, e);
				None
			}
		}
	}
}

/// The client-side fetch effect: loading, then settled.
async fn fetch<T, E, F, Fut>(set_state: SetState<AsyncResult<T>>, default: T, callback: F)
where
	T: Clone,
	E: fmt::Display,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	set_state(AsyncResult::loading(default.clone()));
	let outcome = AssertUnwindSafe(async move { callback().await })
		.catch_unwind()
		.await;
	let settled = match outcome {
		Ok(outcome) => AsyncResult::from_outcome(outcome, default),
		Err(payload) => {
			let error = AsyncError::panicked(payload);
			error_log!("async operation panicked: {}", error.message());
			AsyncResult::failure(default, error)
		}
	};
	set_state(settled);
}

#[cfg(not(target_arch = "wasm32"))]
fn settle_on_server<T, E, F, Fut>(config: AsyncStateConfig, default: T, callback: F) -> AsyncResult<T>
where
	E: fmt::Display,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	crate::bridge::SyncBridge::new(config.poll).settle(default, callback)
}

#[cfg(target_arch = "wasm32")]
fn settle_on_server<T, E, F, Fut>(
	_config: AsyncStateConfig,
	default: T,
	_callback: F,
) -> AsyncResult<T>
where
	E: fmt::Display,
	F: FnOnce() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	error_log!("server render mode is not supported on wasm32");
	AsyncResult::failure(
		default,
		AsyncError::new(
			crate::result::AsyncErrorKind::Unsupported,
			"server render mode is not supported on wasm32",
		),
	)
}

/// Second element of the hook's return value.
///
/// On the client it forwards to the host's state setter. On the server the
/// render pass has already returned by the time anyone could call it, so it
/// is inert and updates are dropped.
pub struct Updater<T> {
	set_state: Option<SetState<AsyncResult<T>>>,
}

impl<T> Updater<T> {
	fn new(set_state: SetState<AsyncResult<T>>) -> Self {
		Self {
			set_state: Some(set_state),
		}
	}

	fn inert() -> Self {
		Self { set_state: None }
	}

	/// Returns `true` for updaters returned by a server render.
	pub fn is_inert(&self) -> bool {
		self.set_state.is_none()
	}

	/// Replaces the component's state.
	pub fn set(&self, state: AsyncResult<T>) {
		match &self.set_state {
			Some(set_state) => set_state(state),
			None => {
				drop(state);
				debug_log!("ignoring state update after server render");
			}
		}
	}
}

impl<T> Clone for Updater<T> {
	fn clone(&self) -> Self {
		Self {
			set_state: self.set_state.clone(),
		}
	}
}

impl<T> fmt::Debug for Updater<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Updater")
			.field("inert", &self.is_inert())
			.finish()
	}
}
