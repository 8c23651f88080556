//! Shared components and operations for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use reinhardt_async_state::{AsyncResult, Binding, TestHost};

/// Result type of the fixture operations.
pub type Greeting = Option<String>;

/// Resolves to `"success!"` after 50 ms.
pub async fn success_operation() -> Result<Greeting, String> {
	tokio::time::sleep(Duration::from_millis(50)).await;
	Ok(Some("success!".to_string()))
}

/// Fails with `"error!"` after 50 ms.
pub async fn failure_operation() -> Result<Greeting, String> {
	tokio::time::sleep(Duration::from_millis(50)).await;
	Err("error!".to_string())
}

/// Resolves to `true` after 50 ms.
pub async fn flag_operation() -> Result<bool, String> {
	tokio::time::sleep(Duration::from_millis(50)).await;
	Ok(true)
}

/// Wraps `operation` so every invocation is counted.
pub fn counted<F, Fut>(operation: F) -> (Rc<Cell<usize>>, impl FnOnce() -> Fut + 'static)
where
	F: FnOnce() -> Fut + 'static,
{
	let calls = Rc::new(Cell::new(0));
	let counter = Rc::clone(&calls);
	let wrapped = move || {
		counter.set(counter.get() + 1);
		operation()
	};
	(calls, wrapped)
}

/// Markup for a greeting state.
pub fn render_greeting(state: &AsyncResult<Greeting>) -> String {
	let mut html = String::new();
	if state.loading {
		html.push_str("<span>Loading</span>");
	}
	if let Some(greeting) = &state.result {
		html.push_str(&format!("<span>{greeting}</span>"));
	}
	if let Some(error) = &state.error {
		html.push_str(&format!("<span>{}</span>", error.message()));
	}
	html
}

/// A component showing the greeting produced by `operation`.
pub fn test_component<F, Fut>(binding: &Binding, host: &TestHost, operation: F) -> String
where
	F: FnOnce() -> Fut + 'static,
	Fut: Future<Output = Result<Greeting, String>> + 'static,
{
	host.begin_render();
	let (state, _) = binding.use_async_state(host, None, operation, None);
	render_greeting(&state)
}

/// A parent component instance and the child it renders once its flag is set.
#[derive(Debug, Default)]
pub struct ParentTree {
	pub parent: TestHost,
	pub child: TestHost,
}

impl ParentTree {
	pub fn new() -> Self {
		Self::default()
	}

	/// Renders the parent and, when its flag resolved to `true`, the child.
	pub fn render(&self, binding: &Binding) -> String {
		self.parent.begin_render();
		let (flag, _) = binding.use_async_state(&self.parent, false, flag_operation, None);

		let mut html = String::from("<h1>Result:</h1>");
		if flag.result {
			html.push_str(&test_component(binding, &self.child, success_operation));
		}
		html
	}
}
