//! Synchronous bridge for server-side rendering.
//!
//! A server render pass is a plain synchronous function, but the operations
//! it renders are async. [`SyncBridge`] drives one operation to completion on
//! the calling thread before the render continues:
//!
//! 1. The operation is polled with a waker that raises a completion flag and
//!    unparks the calling thread.
//! 2. While the operation is pending the thread waits according to the
//!    [`PollStrategy`], either parked until woken or sleeping in fixed slices.
//! 3. The outcome, or a captured panic, is returned to the caller.
//!
//! The operation runs inside a tokio runtime context so timers and IO inside
//! it resolve. A multi-thread runtime the caller is already on is reused
//! (the wait goes through `block_in_place`); otherwise a process-wide runtime
//! is entered, since a current-thread runtime cannot drive its timers while
//! its only thread is blocked here.
//!
//! An operation that never settles blocks forever. There is no timeout.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::thread::{self, Thread};

use futures::FutureExt;
use futures::task::{ArcWake, waker};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::config::PollStrategy;
use crate::result::{AsyncError, AsyncErrorKind, AsyncResult};
use crate::{debug_log, error_log};

/// Drives async operations to completion from synchronous code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncBridge {
	strategy: PollStrategy,
}

impl SyncBridge {
	/// Creates a bridge with the given wait strategy.
	pub fn new(strategy: PollStrategy) -> Self {
		Self { strategy }
	}

	/// The wait strategy in use.
	pub fn strategy(&self) -> PollStrategy {
		self.strategy
	}

	/// Runs `operation` to completion and returns its AsyncResult.
	///
	/// Failures and panics are captured into `error` with `default` as the
	/// result; this never panics on behalf of the operation.
	pub fn settle<T, E, Fut, F>(&self, default: T, operation: F) -> AsyncResult<T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: std::fmt::Display,
	{
		match self.run(operation) {
			Ok(outcome) => AsyncResult::from_outcome(outcome, default),
			Err(error) => AsyncResult::failure(default, error),
		}
	}

	/// Runs the future returned by `operation` to completion.
	///
	/// `operation` is invoked inside the runtime context so futures that
	/// register timers on creation bind to a runtime that is being driven.
	/// Returns `Err` if the operation panicked or no runtime could be built.
	pub fn run<Fut, F>(&self, operation: F) -> Result<Fut::Output, AsyncError>
	where
		F: FnOnce() -> Fut,
		Fut: Future,
	{
		let (handle, on_worker) = runtime_handle().inspect_err(|e| {
			error_log!("{}", e);
		})?;
		let _guard = handle.enter();

		let outcome = if on_worker {
			tokio::task::block_in_place(|| self.drive(operation))
		} else {
			self.drive(operation)
		};

		debug_log!("bridge settled ({:?}, worker: {})", self.strategy, on_worker);
		outcome.map_err(|payload| {
			let error = AsyncError::panicked(payload);
			error_log!("async operation panicked during render: {}", error.message());
			error
		})
	}

	fn drive<Fut, F>(&self, operation: F) -> std::thread::Result<Fut::Output>
	where
		F: FnOnce() -> Fut,
		Fut: Future,
	{
		let future = match std::panic::catch_unwind(AssertUnwindSafe(operation)) {
			Ok(future) => future,
			Err(payload) => return Err(payload),
		};
		let mut future = pin!(AssertUnwindSafe(future).catch_unwind());

		let flag = Arc::new(CompletionFlag::new(thread::current()));
		let waker = waker(Arc::clone(&flag));
		let mut cx = Context::from_waker(&waker);

		loop {
			match future.as_mut().poll(&mut cx) {
				Poll::Ready(outcome) => return outcome,
				Poll::Pending => self.wait(&flag),
			}
		}
	}

	fn wait(&self, flag: &CompletionFlag) {
		match self.strategy {
			PollStrategy::YieldUntilReady => {
				while !flag.take() {
					thread::park();
				}
			}
			PollStrategy::FixedInterval(slice) => {
				while !flag.take() {
					thread::sleep(slice);
				}
			}
		}
	}
}

/// Waker state: set when the operation may make progress.
struct CompletionFlag {
	woken: AtomicBool,
	thread: Thread,
}

impl CompletionFlag {
	fn new(thread: Thread) -> Self {
		Self {
			woken: AtomicBool::new(false),
			thread,
		}
	}

	fn take(&self) -> bool {
		self.woken.swap(false, Ordering::AcqRel)
	}
}

impl ArcWake for CompletionFlag {
	fn wake_by_ref(arc_self: &Arc<Self>) {
		arc_self.woken.store(true, Ordering::Release);
		arc_self.thread.unpark();
	}
}

/// Picks the runtime to drive operations on.
///
/// Returns the handle and whether the calling thread is a worker of it.
fn runtime_handle() -> Result<(Handle, bool), AsyncError> {
	if let Ok(handle) = Handle::try_current()
		&& matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread)
	{
		return Ok((handle, true));
	}

	static BRIDGE_RT: OnceLock<Result<Runtime, String>> = OnceLock::new();
	let runtime = BRIDGE_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("reinhardt-async-state-bridge")
			.build()
			.map_err(|e| e.to_string())
	});
	match runtime {
		Ok(runtime) => Ok((runtime.handle().clone(), false)),
		Err(message) => Err(AsyncError::new(
			AsyncErrorKind::Unsupported,
			format!("bridge runtime unavailable: {message}"),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::time::{Duration, Instant};

	fn strategies() -> [PollStrategy; 2] {
		[
			PollStrategy::YieldUntilReady,
			PollStrategy::FixedInterval(Duration::from_millis(5)),
		]
	}

	#[rstest]
	fn test_settle_ready_future() {
		for strategy in strategies() {
			let bridge = SyncBridge::new(strategy);
			let state = bridge.settle(0, || async { Ok::<_, String>(7) });
			assert_eq!(state, AsyncResult::success(7));
		}
	}

	#[rstest]
	fn test_settle_waits_for_timer() {
		for strategy in strategies() {
			let bridge = SyncBridge::new(strategy);
			let started = Instant::now();
			let state = bridge.settle(None, || async {
				tokio::time::sleep(Duration::from_millis(50)).await;
				Ok::<_, String>(Some("success!"))
			});
			assert!(started.elapsed() >= Duration::from_millis(50));
			assert_eq!(state, AsyncResult::success(Some("success!")));
		}
	}

	#[rstest]
	fn test_settle_captures_failure() {
		let bridge = SyncBridge::default();
		let state = bridge.settle(None::<String>, || async {
			tokio::time::sleep(Duration::from_millis(50)).await;
			Err::<Option<String>, _>("error!")
		});
		assert_eq!(state.result, None);
		assert_eq!(state.error.as_ref().map(AsyncError::message), Some("error!"));
		assert!(!state.loading);
	}

	#[rstest]
	fn test_settle_captures_panic_in_future() {
		let bridge = SyncBridge::default();
		let state = bridge.settle(1, || async {
			if true {
				panic!("exploded");
			}
			Ok::<i32, String>(2)
		});
		assert_eq!(state.result, 1);
		let error = state.error.unwrap();
		assert_eq!(error.kind, AsyncErrorKind::Panicked);
		assert_eq!(error.message(), "exploded");
	}

	#[rstest]
	fn test_settle_captures_panic_in_constructor() {
		let bridge = SyncBridge::default();
		let state = bridge.settle(
			1,
			|| -> std::future::Ready<Result<i32, String>> { panic!("no future") },
		);
		assert_eq!(state.error.unwrap().kind, AsyncErrorKind::Panicked);
	}

	#[rstest]
	fn test_run_inside_current_thread_runtime() {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.unwrap();
		let value = runtime.block_on(async {
			SyncBridge::default().run(|| async {
				tokio::time::sleep(Duration::from_millis(20)).await;
				"done"
			})
		});
		assert_eq!(value.unwrap(), "done");
	}

	#[rstest]
	fn test_run_inside_multi_thread_runtime() {
		let runtime = tokio::runtime::Builder::new_multi_thread()
			.worker_threads(2)
			.enable_all()
			.build()
			.unwrap();
		let value = runtime.block_on(async {
			tokio::spawn(async {
				SyncBridge::new(PollStrategy::YieldUntilReady).run(|| async {
					tokio::time::sleep(Duration::from_millis(20)).await;
					42
				})
			})
			.await
			.unwrap()
		});
		assert_eq!(value.unwrap(), 42);
	}

	#[rstest]
	fn test_operation_runs_on_calling_thread() {
		let caller = thread::current().id();
		let observed = SyncBridge::default()
			.run(|| async { thread::current().id() })
			.unwrap();
		assert_eq!(observed, caller);
	}
}
