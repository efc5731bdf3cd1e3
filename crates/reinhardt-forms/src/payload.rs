//! Decoding of bracket-notation request payloads.
//!
//! Browsers submit nested form fields as flat pairs such as
//! `orders[_state][_sorting_state][name]=asc`. This module folds those pairs
//! back into the nested JSON tree that [`FormState`](crate::FormState) reads.
//! Object key order follows submission order, which sort precedence relies on.

use crate::error::{StateError, StateResult};
use serde_json::{Map, Value};

/// Decodes an `application/x-www-form-urlencoded` string into a nested payload.
///
/// Empty bracket segments (`a[]`) append to a list. A key whose brackets do
/// not balance is kept verbatim as a single top-level key.
///
/// # Examples
///
/// ```
/// use reinhardt_forms::payload::parse_nested_query;
/// use serde_json::json;
///
/// let payload = parse_nested_query("f[_state][_sorting_state][name]=desc&f[ids][]=1&f[ids][]=2").unwrap();
/// assert_eq!(
/// 	payload,
/// 	json!({"f": {"_state": {"_sorting_state": {"name": "desc"}}, "ids": ["1", "2"]}})
/// );
/// ```
pub fn parse_nested_query(input: &str) -> StateResult<Value> {
	let pairs: Vec<(String, String)> =
		serde_urlencoded::from_str(input).map_err(|e| StateError::Payload(e.to_string()))?;
	Ok(nest_pairs(pairs))
}

/// Folds already decoded key/value pairs into a nested payload.
pub fn nest_pairs<I, K, V>(pairs: I) -> Value
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: Into<String>,
{
	let mut root = Value::Object(Map::new());
	for (key, value) in pairs {
		let segments = split_key(key.as_ref());
		insert(&mut root, &segments, value.into());
	}
	root
}

/// Splits `a[b][c]` into `["a", "b", "c"]`.
fn split_key(key: &str) -> Vec<String> {
	let Some(open) = key.find('[') else {
		return vec![key.to_string()];
	};
	if open == 0 {
		return vec![key.to_string()];
	}

	let mut segments = vec![key[..open].to_string()];
	let mut rest = &key[open..];
	while !rest.is_empty() {
		let Some(inner) = rest.strip_prefix('[') else {
			return vec![key.to_string()];
		};
		let Some(close) = inner.find(']') else {
			return vec![key.to_string()];
		};
		segments.push(inner[..close].to_string());
		rest = &inner[close + 1..];
	}
	segments
}

fn insert(node: &mut Value, segments: &[String], value: String) {
	let Some((head, tail)) = segments.split_first() else {
		*node = Value::String(value);
		return;
	};

	if head.is_empty() {
		if !node.is_array() {
			*node = Value::Array(Vec::new());
		}
		if let Value::Array(items) = node {
			items.push(Value::Null);
			if let Some(slot) = items.last_mut() {
				insert(slot, tail, value);
			}
		}
		return;
	}

	if !node.is_object() {
		*node = Value::Object(Map::new());
	}
	if let Value::Object(map) = node {
		let slot = map.entry(head.clone()).or_insert(Value::Null);
		insert(slot, tail, value);
	}
}
