//! Re-keying of row sequences by a designated column.

use crate::error::{TableError, TableResult};
use crate::row::{KeyedRow, Row, RowKey};
use crate::value::value_text;
use indexmap::IndexMap;
use indexmap::map::Entry;

/// Lazily re-keys rows by the value of one column.
///
/// Without a key column rows keep the key the source gave them. A row that
/// lacks the key column yields a [`TableError::Data`] at the point it is
/// pulled; nothing is checked up front.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{KeyedRow, Row, RowKey, RowKeyProjection};
/// use serde_json::json;
///
/// let rows = vec![
/// 	Ok(KeyedRow::new(RowKey::Position(0), Row::from_iter([("id", json!(7))]))),
/// 	Ok(KeyedRow::new(RowKey::Position(1), Row::from_iter([("name", json!("x"))]))),
/// ];
/// let mut projected = RowKeyProjection::new(rows.into_iter(), Some("id".to_string()));
///
/// assert_eq!(projected.next().unwrap().unwrap().key, RowKey::Value("7".to_string()));
/// assert!(projected.next().unwrap().is_err());
/// ```
#[derive(Debug)]
pub struct RowKeyProjection<I> {
	inner: I,
	column: Option<String>,
}

impl<I> RowKeyProjection<I>
where
	I: Iterator<Item = TableResult<KeyedRow>>,
{
	pub fn new(inner: I, column: Option<String>) -> Self {
		Self { inner, column }
	}

	/// The designated key column, if any.
	pub fn column(&self) -> Option<&str> {
		self.column.as_deref()
	}

	/// Drains the page into an ordered key to row map.
	///
	/// # Errors
	///
	/// Propagates the first row error, and returns [`TableError::Data`] when
	/// two rows of the page share a key.
	pub fn into_map(self) -> TableResult<IndexMap<RowKey, Row>> {
		let mut map = IndexMap::new();
		for keyed in self {
			let KeyedRow { key, row } = keyed?;
			match map.entry(key) {
				Entry::Occupied(entry) => {
					return Err(TableError::Data(format!(
						"row key {} appears more than once in the page",
						entry.key()
					)));
				}
				Entry::Vacant(entry) => {
					entry.insert(row);
				}
			}
		}
		Ok(map)
	}

	fn project(&self, keyed: KeyedRow) -> TableResult<KeyedRow> {
		let Some(column) = self.column.as_deref() else {
			return Ok(keyed);
		};
		match keyed.row.get(column) {
			Some(value) => {
				let key = RowKey::Value(value_text(value).into_owned());
				Ok(KeyedRow::new(key, keyed.row))
			}
			None => Err(TableError::Data(format!(
				"row {} has no key column {column:?}",
				keyed.key
			))),
		}
	}
}

impl<I> Iterator for RowKeyProjection<I>
where
	I: Iterator<Item = TableResult<KeyedRow>>,
{
	type Item = TableResult<KeyedRow>;

	fn next(&mut self) -> Option<Self::Item> {
		let item = self.inner.next()?;
		Some(item.and_then(|keyed| self.project(keyed)))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}
