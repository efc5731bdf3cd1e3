//! Column declarations.

mod base;

pub use base::Column;

use indexmap::IndexMap;

/// The declared columns of a table, in declaration order.
///
/// An empty set means the table did not declare its columns; every column
/// key is then accepted and compares naturally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
	columns: IndexMap<String, Column>,
}

impl ColumnSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a column, returning the one it replaced if the key was taken.
	pub fn insert(&mut self, column: Column) -> Option<Column> {
		self.columns.insert(column.key().to_string(), column)
	}

	pub fn get(&self, key: &str) -> Option<&Column> {
		self.columns.get(key)
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Column> {
		self.columns.values()
	}
}

impl FromIterator<Column> for ColumnSet {
	fn from_iter<T: IntoIterator<Item = Column>>(iter: T) -> Self {
		let mut set = Self::new();
		for column in iter {
			set.insert(column);
		}
		set
	}
}
