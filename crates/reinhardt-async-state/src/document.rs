//! Embedded-state token handling.
//!
//! The server writes the encoded store into a single `data-state` attribute
//! on `<body>`. On the client a [`Document`] exposes that attribute so the
//! hydration loader can read it once and remove it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::store::Store;

/// The body attribute that carries the encoded store.
pub const STATE_ATTRIBUTE: &str = "data-state";

static BODY_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<body\b([^>]*)>").expect("BODY_TAG: invalid regex pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
		.expect("ATTRIBUTE: invalid regex pattern")
});

/// Access to the rendered document's body attributes.
pub trait Document {
	/// Returns the value of a body attribute.
	fn body_attribute(&self, name: &str) -> Option<String>;

	/// Removes a body attribute. Removing a missing attribute is a no-op.
	fn remove_body_attribute(&mut self, name: &str);
}

/// An in-memory document, usable outside the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDocument {
	body_attributes: BTreeMap<String, String>,
}

impl StaticDocument {
	/// Creates a document with no body attributes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a document whose body carries `token` as embedded state.
	pub fn with_state(token: impl Into<String>) -> Self {
		let mut document = Self::new();
		document.set_body_attribute(STATE_ATTRIBUTE, token);
		document
	}

	/// Reads the body attributes of a rendered HTML document.
	///
	/// Only the first `<body>` start tag is inspected. Entity references in
	/// attribute values are decoded for the basic HTML escapes.
	pub fn from_html(html: &str) -> Self {
		let mut document = Self::new();
		let Some(attrs) = BODY_TAG.captures(html).and_then(|c| c.get(1)) else {
			return document;
		};
		for capture in ATTRIBUTE.captures_iter(attrs.as_str()) {
			let name = capture[1].to_ascii_lowercase();
			let value = capture
				.get(2)
				.or_else(|| capture.get(3))
				.or_else(|| capture.get(4))
				.map(|m| unescape_attribute(m.as_str()))
				.unwrap_or_default();
			document.body_attributes.entry(name).or_insert(value);
		}
		document
	}

	/// Sets a body attribute.
	pub fn set_body_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.body_attributes.insert(name.into(), value.into());
	}

	/// All body attributes.
	pub fn body_attributes(&self) -> &BTreeMap<String, String> {
		&self.body_attributes
	}
}

impl Document for StaticDocument {
	fn body_attribute(&self, name: &str) -> Option<String> {
		self.body_attributes.get(name).cloned()
	}

	fn remove_body_attribute(&mut self, name: &str) {
		self.body_attributes.remove(name);
	}
}

/// The live browser document.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDocument;

#[cfg(target_arch = "wasm32")]
impl WebDocument {
	/// Creates a handle to `window.document`.
	pub fn new() -> Self {
		Self
	}

	fn body() -> Option<web_sys::HtmlElement> {
		web_sys::window()?.document()?.body()
	}
}

#[cfg(target_arch = "wasm32")]
impl Document for WebDocument {
	fn body_attribute(&self, name: &str) -> Option<String> {
		Self::body()?.get_attribute(name)
	}

	fn remove_body_attribute(&mut self, name: &str) {
		if let Some(body) = Self::body() {
			let _ = body.remove_attribute(name);
		}
	}
}

/// Wraps rendered markup in a `<body>` that carries `token`.
pub fn render_body(token: Option<&str>, inner_html: &str) -> String {
	match token {
		Some(token) => format!(
			r#"<body {}="{}">{}</body>"#,
			STATE_ATTRIBUTE,
			escape_attribute(token),
			inner_html
		),
		None => format!("<body>{}</body>", inner_html),
	}
}

/// Wraps rendered markup in a `<body>` carrying the encoded `store`.
pub fn render_store_body(store: &Store, inner_html: &str) -> Result<String, serde_json::Error> {
	let token = store.encode()?;
	Ok(render_body(Some(&token), inner_html))
}

fn escape_attribute(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'"' => escaped.push_str("&quot;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

fn unescape_attribute(value: &str) -> String {
	value
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&amp;", "&")
}
