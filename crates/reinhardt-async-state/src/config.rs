//! Hook configuration.
//!
//! The only tunable is how the server-side bridge waits for a pending
//! operation. Configuration can be built in code or loaded from TOML or JSON:
//!
//! ```toml
//! pollStrategy = "fixed-interval"
//! intervalMs = 25
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default slice slept between completion checks.
pub const DEFAULT_INTERVAL_MS: u64 = 10;

/// Errors raised while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// A fixed interval must be at least one millisecond.
	#[error("intervalMs must be a positive integer")]
	ZeroInterval,
	/// The TOML document could not be parsed.
	#[error("invalid TOML configuration: {0}")]
	Toml(#[from] toml::de::Error),
	/// The JSON document could not be parsed.
	#[error("invalid JSON configuration: {0}")]
	Json(#[from] serde_json::Error),
}

/// How the server-side bridge waits for a pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollStrategy {
	/// Park the calling thread until the operation's waker fires.
	YieldUntilReady,
	/// Sleep in fixed slices, re-checking completion after each one.
	FixedInterval(Duration),
}

impl Default for PollStrategy {
	fn default() -> Self {
		Self::FixedInterval(Duration::from_millis(DEFAULT_INTERVAL_MS))
	}
}

/// Configuration accepted by [`Binding::use_async_state`](crate::Binding::use_async_state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct AsyncStateConfig {
	/// Wait strategy for the server-side bridge.
	pub poll: PollStrategy,
}

impl AsyncStateConfig {
	/// Creates the default configuration (fixed 10ms slices).
	pub fn new() -> Self {
		Self::default()
	}

	/// Waits by parking until the operation is ready.
	pub fn yield_until_ready() -> Self {
		Self {
			poll: PollStrategy::YieldUntilReady,
		}
	}

	/// Waits in fixed slices of `interval_ms` milliseconds.
	pub fn fixed_interval(interval_ms: u64) -> Result<Self, ConfigError> {
		if interval_ms == 0 {
			return Err(ConfigError::ZeroInterval);
		}
		Ok(Self {
			poll: PollStrategy::FixedInterval(Duration::from_millis(interval_ms)),
		})
	}

	/// Parses a TOML configuration document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Parses a JSON configuration document.
	pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(source)?)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum RawStrategy {
	YieldUntilReady,
	#[default]
	FixedInterval,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
	#[serde(default, alias = "poll_strategy")]
	poll_strategy: RawStrategy,
	#[serde(default, alias = "interval_ms")]
	interval_ms: Option<u64>,
}

impl TryFrom<RawConfig> for AsyncStateConfig {
	type Error = ConfigError;

	fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
		match raw.poll_strategy {
			RawStrategy::YieldUntilReady => Ok(Self::yield_until_ready()),
			RawStrategy::FixedInterval => {
				Self::fixed_interval(raw.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_default_is_fixed_ten_millis() {
		assert_eq!(
			AsyncStateConfig::default().poll,
			PollStrategy::FixedInterval(Duration::from_millis(10))
		);
	}

	#[rstest]
	fn test_fixed_interval_rejects_zero() {
		assert!(matches!(
			AsyncStateConfig::fixed_interval(0),
			Err(ConfigError::ZeroInterval)
		));
	}

	#[rstest]
	#[case::camel_case("pollStrategy = \"fixed-interval\"\nintervalMs = 25", PollStrategy::FixedInterval(Duration::from_millis(25)))]
	#[case::snake_case("poll_strategy = \"fixed-interval\"\ninterval_ms = 5", PollStrategy::FixedInterval(Duration::from_millis(5)))]
	#[case::yield_ignores_interval("pollStrategy = \"yield-until-ready\"\nintervalMs = 99", PollStrategy::YieldUntilReady)]
	#[case::interval_only("intervalMs = 40", PollStrategy::FixedInterval(Duration::from_millis(40)))]
	#[case::empty("", PollStrategy::FixedInterval(Duration::from_millis(10)))]
	fn test_from_toml(#[case] source: &str, #[case] expected: PollStrategy) {
		let config = AsyncStateConfig::from_toml_str(source).unwrap();
		assert_eq!(config.poll, expected);
	}

	#[rstest]
	fn test_from_json() {
		let config =
			AsyncStateConfig::from_json_str(r#"{"pollStrategy": "yield-until-ready"}"#).unwrap();
		assert_eq!(config, AsyncStateConfig::yield_until_ready());
	}

	#[rstest]
	#[case::zero_interval("intervalMs = 0")]
	#[case::unknown_strategy("pollStrategy = \"busy-spin\"")]
	#[case::unknown_key("sleep = 10")]
	fn test_from_toml_rejects(#[case] source: &str) {
		assert!(AsyncStateConfig::from_toml_str(source).is_err());
	}
}
