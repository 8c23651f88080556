//! A reference [`Host`] for tests.
//!
//! [`TestHost`] models a single component instance the way hook-based UI
//! frameworks do: slots are identified by call order within a render, the
//! value of a state slot survives re-renders, and post-commit effects start
//! only when the render is committed.
//!
//! Effects are spawned with `tokio::task::spawn_local`, so `commit` must be
//! called from inside a `tokio::task::LocalSet`.
//!
//! ## Example
//!
//! ```ignore
//! let host = TestHost::new();
//! let local = tokio::task::LocalSet::new();
//! local.run_until(async {
//!     host.begin_render();
//!     let (state, _) = binding.use_async_state(&host, None, fetch, None);
//!     host.commit();
//!     host.settle().await;
//!     assert!(host.current::<AsyncResult<Option<String>>>(0).is_settled());
//! }).await;
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tokio::task::JoinHandle;

use crate::host::{Host, OnceGuard, SetState};

struct StateCell<T> {
	value: RefCell<T>,
	history: RefCell<Vec<T>>,
}

impl<T: Clone> StateCell<T> {
	fn new(initial: T) -> Self {
		Self {
			value: RefCell::new(initial.clone()),
			history: RefCell::new(vec![initial]),
		}
	}

	fn replace(&self, value: T) {
		self.history.borrow_mut().push(value.clone());
		*self.value.borrow_mut() = value;
	}
}

enum Slot {
	State(Rc<dyn Any>),
	Once(OnceGuard),
}

/// One component instance driven by a test.
#[derive(Default)]
pub struct TestHost {
	slots: RefCell<Vec<Slot>>,
	cursor: Cell<usize>,
	renders: Cell<usize>,
	updates: Rc<Cell<usize>>,
	queued: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
	running: RefCell<Vec<JoinHandle<()>>>,
}

impl TestHost {
	/// Creates an instance that has not rendered yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a render pass; slot numbering restarts at zero.
	pub fn begin_render(&self) {
		self.cursor.set(0);
		self.renders.set(self.renders.get() + 1);
	}

	/// Number of render passes started so far.
	pub fn renders(&self) -> usize {
		self.renders.get()
	}

	/// Number of state updates made through any setter.
	///
	/// A framework would schedule one re-render per update.
	pub fn updates(&self) -> usize {
		self.updates.get()
	}

	/// Commits the current render, starting every queued effect.
	///
	/// # Panics
	///
	/// Panics if called outside a `tokio::task::LocalSet`.
	pub fn commit(&self) {
		let queued = std::mem::take(&mut *self.queued.borrow_mut());
		let mut running = self.running.borrow_mut();
		for effect in queued {
			running.push(tokio::task::spawn_local(effect));
		}
	}

	/// Waits until every started effect has finished.
	///
	/// # Panics
	///
	/// Panics if an effect panicked.
	pub async fn settle(&self) {
		loop {
			let running = std::mem::take(&mut *self.running.borrow_mut());
			if running.is_empty() {
				return;
			}
			for handle in running {
				if let Err(e) = handle.await {
					panic!("effect failed: {e}");
				}
			}
		}
	}

	/// Effects queued by the current render that have not been committed.
	pub fn pending_effects(&self) -> usize {
		self.queued.borrow().len()
	}

	/// Every value the state slot at `slot` has held, oldest first.
	///
	/// # Panics
	///
	/// Panics if `slot` is not a state slot holding a `T`.
	pub fn history<T: Clone + 'static>(&self, slot: usize) -> Vec<T> {
		self.state_cell::<T>(slot).history.borrow().clone()
	}

	/// The current value of the state slot at `slot`.
	///
	/// # Panics
	///
	/// Panics if `slot` is not a state slot holding a `T`.
	pub fn current<T: Clone + 'static>(&self, slot: usize) -> T {
		self.state_cell::<T>(slot).value.borrow().clone()
	}

	fn next_slot(&self) -> usize {
		let index = self.cursor.get();
		self.cursor.set(index + 1);
		index
	}

	fn state_cell<T: 'static>(&self, slot: usize) -> Rc<StateCell<T>> {
		let slots = self.slots.borrow();
		match slots.get(slot) {
			Some(Slot::State(cell)) => match Rc::clone(cell).downcast::<StateCell<T>>() {
				Ok(cell) => cell,
				Err(_) => panic!("state slot {slot} holds a different type"),
			},
			Some(Slot::Once(_)) => panic!("slot {slot} is a once guard"),
			None => panic!("slot {slot} was never reached"),
		}
	}
}

impl Host for TestHost {
	fn use_state<T: Clone + 'static>(&self, initial: T) -> (T, SetState<T>) {
		let index = self.next_slot();
		{
			let mut slots = self.slots.borrow_mut();
			if index == slots.len() {
				slots.push(Slot::State(Rc::new(StateCell::new(initial))));
			}
		}
		let cell = self.state_cell::<T>(index);
		let value = cell.value.borrow().clone();
		let updates = Rc::clone(&self.updates);
		let set_state: SetState<T> = Rc::new(move |value: T| {
			cell.replace(value);
			updates.set(updates.get() + 1);
		});
		(value, set_state)
	}

	fn use_once(&self) -> OnceGuard {
		let index = self.next_slot();
		let mut slots = self.slots.borrow_mut();
		if index == slots.len() {
			slots.push(Slot::Once(OnceGuard::new()));
		}
		match &slots[index] {
			Slot::Once(guard) => guard.clone(),
			Slot::State(_) => panic!("hook order changed: slot {index} is a state slot"),
		}
	}

	fn after_commit(&self, effect: LocalBoxFuture<'static, ()>) {
		self.queued.borrow_mut().push(effect);
	}
}

impl fmt::Debug for TestHost {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TestHost")
			.field("slots", &self.slots.borrow().len())
			.field("renders", &self.renders.get())
			.field("pending_effects", &self.pending_effects())
			.field("running", &self.running.borrow().len())
			.finish()
	}
}
