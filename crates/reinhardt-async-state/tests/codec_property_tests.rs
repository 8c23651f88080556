//! Codec property-based tests
//!
//! Property-based tests for the embedded-state token.

use proptest::prelude::*;
use reinhardt_async_state::{AsyncError, AsyncResult, Entries, codec};
use rstest::*;
use serde_json::Value;

fn json_value() -> impl Strategy<Value = Value> {
	let leaf = prop_oneof![
		Just(Value::Null),
		any::<bool>().prop_map(Value::from),
		any::<i64>().prop_map(Value::from),
		any::<u64>().prop_map(Value::from),
		any::<f64>()
			.prop_filter("JSON numbers are finite", |f| f.is_finite())
			.prop_map(Value::from),
		"\\PC{0,24}".prop_map(Value::from),
		r#"["\\\\/<>&'\n\t\x{0}-\x{1f}]{0,12}"#.prop_map(Value::from),
	];
	leaf.prop_recursive(4, 48, 6, |inner| {
		prop_oneof![
			prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
			prop::collection::btree_map("\\PC{0,8}", inner, 0..6)
				.prop_map(|map| Value::Object(map.into_iter().collect())),
		]
	})
}

fn settled_entry() -> impl Strategy<Value = AsyncResult<Value>> {
	(json_value(), proptest::option::of("\\PC{1,16}")).prop_map(|(value, error)| {
		match error {
			Some(message) => AsyncResult::failure(value, AsyncError::failed(message)),
			None => AsyncResult::success(value),
		}
	})
}

fn entries() -> impl Strategy<Value = Entries> {
	prop::collection::btree_map(0_usize..64, settled_entry(), 0..12)
}

proptest! {
	/// Test: token decodes to the encoded entries
	///
	/// Category: Property
	#[rstest]
	fn prop_token_round_trip(entries in entries()) {
		let token = codec::encode(&entries).unwrap();
		prop_assert_eq!(codec::decode(&token).unwrap(), entries);
	}

	/// Test: finite floats survive the token bit for bit
	///
	/// Category: Property
	#[rstest]
	fn prop_float_round_trip(value in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
		let mut entries = Entries::new();
		entries.insert(0, AsyncResult::success(Value::from(value)));
		let decoded = codec::decode(&codec::encode(&entries).unwrap()).unwrap();
		let result = decoded[&0].result.as_f64().unwrap();
		prop_assert_eq!(result.to_bits(), value.to_bits());
	}

	/// Test: token is safe inside a double-quoted attribute
	///
	/// Category: Property
	#[rstest]
	fn prop_token_is_attribute_safe(entries in entries()) {
		let token = codec::encode(&entries).unwrap();
		prop_assert!(
			token
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
		);
	}

	/// Test: decoding arbitrary input fails cleanly
	///
	/// Category: Fuzz
	#[rstest]
	fn prop_decode_arbitrary_input_does_not_panic(input in "\\PC{0,64}") {
		let _ = codec::decode(&input);
	}
}
