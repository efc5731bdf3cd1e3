//! Sort directions and in-memory multi-column sorting.

use crate::error::{TableError, TableResult};
use crate::row::Row;
use crate::value::{ComparisonMode, NULL, Operand};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
	/// Ascending order
	#[serde(rename = "asc")]
	Ascending,
	/// Descending order
	#[serde(rename = "desc")]
	Descending,
}

impl SortDirection {
	/// Returns the opposite direction
	pub fn toggle(&self) -> Self {
		match self {
			Self::Ascending => Self::Descending,
			Self::Descending => Self::Ascending,
		}
	}

	/// Wire form used in submitted state.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Ascending => "asc",
			Self::Descending => "desc",
		}
	}

	/// SQL keyword for ORDER BY.
	pub fn sql_keyword(&self) -> &'static str {
		match self {
			Self::Ascending => "ASC",
			Self::Descending => "DESC",
		}
	}

	/// Reads a submitted sort value.
	///
	/// An empty string or `null` means "not sorted by this column".
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] naming `column` for anything other
	/// than `"asc"`, `"desc"`, `""` or `null`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::SortDirection;
	/// use serde_json::json;
	///
	/// assert_eq!(SortDirection::from_state("name", &json!("desc")).unwrap(), Some(SortDirection::Descending));
	/// assert_eq!(SortDirection::from_state("name", &json!("")).unwrap(), None);
	/// assert!(SortDirection::from_state("name", &json!("up")).is_err());
	/// ```
	pub fn from_state(column: &str, value: &Value) -> TableResult<Option<Self>> {
		match value {
			Value::Null => Ok(None),
			Value::String(s) if s.trim().is_empty() => Ok(None),
			Value::String(s) if s.trim().eq_ignore_ascii_case("asc") => Ok(Some(Self::Ascending)),
			Value::String(s) if s.trim().eq_ignore_ascii_case("desc") => Ok(Some(Self::Descending)),
			other => Err(TableError::validation(
				column,
				format!("sort direction must be \"asc\" or \"desc\", got {other}"),
			)),
		}
	}

	fn apply(&self, ordering: Ordering) -> Ordering {
		match self {
			Self::Ascending => ordering,
			Self::Descending => ordering.reverse(),
		}
	}
}

impl fmt::Display for SortDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Sort columns in precedence order: the first entry decides first.
pub type SortOrder = IndexMap<String, SortDirection>;

/// How array and iterator backends apply more than one sort column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiSortStrategy {
	/// One stable comparator over all columns in precedence order, the same
	/// result an SQL `ORDER BY a, b` gives.
	#[default]
	Combined,
	/// One full stable sort per column, applied in declared order. The last
	/// column ends up deciding first. Kept for tables that depend on the
	/// historical ordering.
	Sequential,
}

/// A sort key resolved against its column's comparison mode.
pub(crate) struct SortKey {
	column: String,
	direction: SortDirection,
	mode: ComparisonMode,
}

impl SortKey {
	pub(crate) fn new(column: impl Into<String>, direction: SortDirection, mode: ComparisonMode) -> Self {
		Self {
			column: column.into(),
			direction,
			mode,
		}
	}

	fn compare(&self, a: &Row, b: &Row) -> Ordering {
		let a = cell_operand(a, &self.column);
		let b = cell_operand(b, &self.column);
		self.direction.apply(self.mode.sort_operands(&a, &b))
	}
}

fn cell_operand<'a>(row: &'a Row, column: &str) -> Operand<'a> {
	Operand::from_value(row.get(column).unwrap_or(&NULL))
}

/// Anything the sorter can read a row out of.
pub(crate) trait SortRow {
	fn sort_row(&self) -> &Row;
}

impl SortRow for Row {
	fn sort_row(&self) -> &Row {
		self
	}
}

impl<T: SortRow + ?Sized> SortRow for &T {
	fn sort_row(&self) -> &Row {
		(**self).sort_row()
	}
}

impl<K, R: SortRow> SortRow for (K, R) {
	fn sort_row(&self) -> &Row {
		self.1.sort_row()
	}
}

/// Sorts `items` in place by the given keys. Stable.
pub(crate) fn sort_rows<T: SortRow>(items: &mut [T], keys: &[SortKey], strategy: MultiSortStrategy) {
	if keys.is_empty() {
		return;
	}
	match strategy {
		MultiSortStrategy::Combined => items.sort_by(|a, b| {
			let (a, b) = (a.sort_row(), b.sort_row());
			keys.iter()
				.map(|key| key.compare(a, b))
				.find(|ordering| ordering.is_ne())
				.unwrap_or(Ordering::Equal)
		}),
		MultiSortStrategy::Sequential => {
			for key in keys {
				items.sort_by(|a, b| key.compare(a.sort_row(), b.sort_row()));
			}
		}
	}
}
