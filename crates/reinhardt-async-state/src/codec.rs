//! Store serialization for the embedded-state token.
//!
//! Entries are written as a JSON object keyed by position and then base64
//! encoded with the standard alphabet. The resulting token only contains
//! `A-Z a-z 0-9 + / =`, so it can sit inside a double-quoted HTML attribute
//! without escaping.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::store::Entries;

/// Errors produced when a state token cannot be turned back into entries.
#[derive(Debug, Error)]
pub enum MalformedTokenError {
	/// The token is not valid base64.
	#[error("state token is not valid base64: {0}")]
	Base64(#[from] base64::DecodeError),
	/// The decoded bytes are not a JSON entries mapping.
	#[error("state token does not contain a valid entries mapping: {0}")]
	Json(#[from] serde_json::Error),
}

/// Encodes store entries into a transport-safe token.
pub fn encode(entries: &Entries) -> Result<String, serde_json::Error> {
	let json = serde_json::to_vec(entries)?;
	Ok(STANDARD.encode(json))
}

/// Decodes a token produced by [`encode`].
pub fn decode(token: &str) -> Result<Entries, MalformedTokenError> {
	let bytes = STANDARD.decode(token)?;
	Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::result::{AsyncError, AsyncResult};
	use rstest::rstest;
	use serde_json::json;

	fn sample() -> Entries {
		let mut entries = Entries::new();
		entries.insert(0, AsyncResult::success(json!("success!")));
		entries.insert(
			1,
			AsyncResult::failure(json!(null), AsyncError::failed("error!")),
		);
		entries.insert(2, AsyncResult::success(json!({"items": [1, 2, 3]})));
		entries
	}

	#[rstest]
	fn test_encode_is_attribute_safe() {
		let token = encode(&sample()).unwrap();
		assert!(
			token
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
		);
	}

	#[rstest]
	fn test_encode_uses_positions_as_keys() {
		let token = encode(&sample()).unwrap();
		let bytes = STANDARD.decode(token).unwrap();
		let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(raw["0"]["result"], json!("success!"));
		assert_eq!(raw["1"]["error"]["message"], json!("error!"));
		assert_eq!(raw["2"]["loading"], json!(false));
	}

	#[rstest]
	fn test_round_trip() {
		let entries = sample();
		let decoded = decode(&encode(&entries).unwrap()).unwrap();
		assert_eq!(decoded, entries);
	}

	#[rstest]
	#[case::last_digit_sensitive(1.0715660391465826e-75)]
	#[case::tenth(0.1)]
	#[case::third(1.0 / 3.0)]
	#[case::huge(f64::MAX)]
	#[case::tiny_subnormal(f64::MIN_POSITIVE / 3.0)]
	#[case::negative(-2.718281828459045)]
	fn test_round_trip_preserves_floats(#[case] value: f64) {
		let mut entries = Entries::new();
		entries.insert(0, AsyncResult::success(json!(value)));

		let decoded = decode(&encode(&entries).unwrap()).unwrap();

		let result = decoded[&0].result.as_f64().unwrap();
		assert_eq!(result.to_bits(), value.to_bits());
		assert_eq!(decoded, entries);
	}

	#[rstest]
	fn test_empty_round_trip() {
		let token = encode(&Entries::new()).unwrap();
		assert_eq!(token, STANDARD.encode("{}"));
		assert!(decode(&token).unwrap().is_empty());
	}

	#[rstest]
	fn test_decode_rejects_invalid_base64() {
		let err = decode("not base64!").unwrap_err();
		assert!(matches!(err, MalformedTokenError::Base64(_)));
	}

	#[rstest]
	#[case::not_json("plain text")]
	#[case::wrong_shape(r#"{"0": 5}"#)]
	#[case::non_numeric_key(r#"{"first": {"result": 1, "error": null, "loading": false}}"#)]
	fn test_decode_rejects_unexpected_payload(#[case] payload: &str) {
		let err = decode(&STANDARD.encode(payload)).unwrap_err();
		assert!(matches!(err, MalformedTokenError::Json(_)));
	}
}
