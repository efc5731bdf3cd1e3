//! Declared table columns.

use crate::value::ComparisonMode;
use serde::{Deserialize, Serialize};

/// A column declared by the table author.
///
/// The declaration fixes how the column's values compare and whether the
/// client may sort or search by it. Rendering of the cells lives elsewhere.
///
/// # Example
///
/// ```rust
/// use reinhardt_tables::column::Column;
/// use reinhardt_tables::ComparisonMode;
///
/// let price = Column::new("price", "Price")
/// 	.comparison(ComparisonMode::Numeric)
/// 	.searchable(false);
///
/// assert_eq!(price.key(), "price");
/// assert!(price.is_sortable());
/// assert!(!price.is_searchable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
	key: String,
	#[serde(default)]
	header: String,
	#[serde(default)]
	comparison: ComparisonMode,
	#[serde(default = "enabled")]
	sortable: bool,
	#[serde(default = "enabled")]
	searchable: bool,
}

fn enabled() -> bool {
	true
}

impl Column {
	/// Creates a sortable, searchable column with natural comparison.
	pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			header: header.into(),
			comparison: ComparisonMode::Natural,
			sortable: true,
			searchable: true,
		}
	}

	/// Sets how values of this column compare
	pub fn comparison(mut self, mode: ComparisonMode) -> Self {
		self.comparison = mode;
		self
	}

	/// Sets whether the client may sort by this column
	pub fn sortable(mut self, sortable: bool) -> Self {
		self.sortable = sortable;
		self
	}

	/// Sets whether the client may search this column
	pub fn searchable(mut self, searchable: bool) -> Self {
		self.searchable = searchable;
		self
	}

	/// Identifier used in state keys, row lookups and SQL.
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn header(&self) -> &str {
		&self.header
	}

	pub fn comparison_mode(&self) -> ComparisonMode {
		self.comparison
	}

	pub fn is_sortable(&self) -> bool {
		self.sortable
	}

	pub fn is_searchable(&self) -> bool {
		self.searchable
	}
}
