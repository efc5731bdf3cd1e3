//! Rows and row keys.

use crate::error::{TableError, TableResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One row of table data: column key to cell value, in column order.
///
/// Rows built from positional data use the stringified index (`"0"`,
/// `"1"`, ...) as column key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, Value>);

impl Row {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a row keyed by position.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::Row;
	/// use serde_json::json;
	///
	/// let row = Row::from_values(vec![json!(7), json!("seven")]);
	/// assert_eq!(row.get("1"), Some(&json!("seven")));
	/// ```
	pub fn from_values(values: Vec<Value>) -> Self {
		values
			.into_iter()
			.enumerate()
			.map(|(i, v)| (i.to_string(), v))
			.collect()
	}

	/// Builds a row out of a JSON object or array.
	///
	/// # Errors
	///
	/// Returns [`TableError::Data`] for scalars, which have no columns.
	pub fn from_json(value: Value) -> TableResult<Self> {
		match value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			Value::Array(items) => Ok(Self::from_values(items)),
			other => Err(TableError::Data(format!(
				"row content is not iterable: {other}"
			))),
		}
	}

	pub fn get(&self, column: &str) -> Option<&Value> {
		self.0.get(column)
	}

	pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(column.into(), value.into())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
		self.0.iter()
	}

	pub fn into_inner(self) -> IndexMap<String, Value> {
		self.0
	}
}

impl<K, V> FromIterator<(K, V)> for Row
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl From<IndexMap<String, Value>> for Row {
	fn from(map: IndexMap<String, Value>) -> Self {
		Self(map)
	}
}

/// Identity of a row within a rendered page.
///
/// Selection widgets name their inputs after this key, so it must be unique
/// within one page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
	/// Index of the row in its source, kept through filtering and sorting.
	Position(usize),
	/// Canonical text of the designated key column.
	Value(String),
}

impl fmt::Display for RowKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Position(index) => write!(f, "{index}"),
			Self::Value(value) => f.write_str(value),
		}
	}
}

/// A row together with the key it is addressed by.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRow {
	pub key: RowKey,
	pub row: Row,
}

impl KeyedRow {
	pub fn new(key: RowKey, row: Row) -> Self {
		Self { key, row }
	}

	pub(crate) fn positional(index: usize, row: Row) -> Self {
		Self::new(RowKey::Position(index), row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_from_json_object_keeps_column_order() {
		let row = Row::from_json(json!({"b": 1, "a": 2})).unwrap();
		let keys: Vec<&str> = row.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["b", "a"]);
	}

	#[rstest]
	#[case(json!(5))]
	#[case(json!("text"))]
	#[case(json!(null))]
	fn test_from_json_scalar_is_data_error(#[case] value: Value) {
		assert!(matches!(Row::from_json(value), Err(TableError::Data(_))));
	}

	#[rstest]
	fn test_row_key_display() {
		assert_eq!(RowKey::Position(4).to_string(), "4");
		assert_eq!(RowKey::Value("abc-1".to_string()).to_string(), "abc-1");
	}
}
