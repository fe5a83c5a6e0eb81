use std::fmt::Write as _;

use evecache::cache::{DecodeOptions, Result, Value};
use serde_json::{Map, Number, json};

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encode failed: {err}"),
	}
}

/// Replace cached-object values with their decoded payloads.
pub(crate) fn expand_cached(value: Value, opt: &DecodeOptions) -> Result<Value> {
	Ok(match value {
		Value::Cached(mut cached) => {
			let payload = cached.decode(opt)?.to_value();
			expand_cached(payload, opt)?
		}
		Value::List(items) => Value::List(items.into_iter().map(|item| expand_cached(item, opt)).collect::<Result<_>>()?),
		Value::Map(map) => {
			let mut out = evecache::cache::ValueMap::new();
			for (key, item) in map.iter() {
				out.insert(key.clone(), expand_cached(item.clone(), opt)?);
			}
			Value::Map(out)
		}
		other => other,
	})
}

/// Convert a projected value to JSON; map keys become their text labels.
pub(crate) fn value_to_json(value: &Value) -> serde_json::Value {
	match value {
		Value::Null => serde_json::Value::Null,
		Value::Bool(value) => serde_json::Value::Bool(*value),
		Value::Int(value) => json!(value),
		Value::Float(value) => Number::from_f64(*value).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
		Value::String(text) => serde_json::Value::String(text.to_string()),
		Value::Bytes(bytes) => json!({ "bytes": hex(bytes) }),
		Value::StringRef(id) => json!({ "string_ref": id }),
		Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
		Value::Map(map) => {
			let mut out = Map::new();
			for (key, item) in map.iter() {
				out.insert(key_label(key), value_to_json(item));
			}
			serde_json::Value::Object(out)
		}
		Value::Cached(cached) => json!({
			"cached": {
				"decoded": cached.is_decoded(),
				"compressed": cached.compressed,
				"raw_len": cached.raw.as_ref().map(Vec::len),
			}
		}),
	}
}

/// Text label for a map key.
pub(crate) fn key_label(key: &Value) -> String {
	match key {
		Value::String(text) => text.to_string(),
		Value::Int(value) => value.to_string(),
		Value::Float(value) => value.to_string(),
		Value::Bool(value) => value.to_string(),
		other => value_to_json(other).to_string(),
	}
}

/// Lowercase hex without separators.
pub(crate) fn hex(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len() * 2);
	for byte in bytes {
		let _ = write!(out, "{byte:02x}");
	}
	out
}

#[cfg(test)]
mod tests {
	use evecache::cache::{Value, ValueMap};
	use serde_json::json;

	use super::{key_label, value_to_json};

	#[test]
	fn maps_use_key_labels() {
		let mut map = ValueMap::new();
		map.insert(Value::String("typeID".into()), Value::Int(34));
		map.insert(Value::Int(7), Value::List(vec![Value::Bool(true), Value::Null]));

		assert_eq!(value_to_json(&Value::Map(map)), json!({ "typeID": 34, "7": [true, null] }));
	}

	#[test]
	fn non_text_scalars_are_tagged() {
		assert_eq!(value_to_json(&Value::Bytes(vec![0xAB, 0x01])), json!({ "bytes": "ab01" }));
		assert_eq!(value_to_json(&Value::StringRef(3)), json!({ "string_ref": 3 }));
		assert_eq!(value_to_json(&Value::Float(f64::NAN)), json!(null));
	}

	#[test]
	fn list_keys_render_as_json_text() {
		let key = Value::List(vec![Value::String("a".into()), Value::Int(1)]);
		assert_eq!(key_label(&key), r#"["a",1]"#);
	}
}
