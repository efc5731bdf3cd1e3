use super::{DataSource, SourcePage, Window};
use crate::error::TableResult;
use crate::filter::RowFilter;
use crate::pagination::PaginationInfo;
use crate::row::{KeyedRow, Row};
use crate::sorting::sort_rows;
use serde_json::Value;
use std::borrow::Cow;

/// Rows held in memory, borrowed or owned.
///
/// Filtering and sorting work on borrowed rows, so only the rows of the
/// requested window are cloned, and each keeps its index in the
/// collection as its positional key.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{ArraySource, DataSource, PaginationInfo, Row, RowKey};
/// use serde_json::json;
///
/// let rows: Vec<Row> = (0..15).map(|i| Row::from_iter([("value", json!(i))])).collect();
/// let mut source = ArraySource::new(&rows[..]);
///
/// let page = source.obtain(&PaginationInfo::new(10, 10), None).unwrap();
/// assert_eq!(page.total_rows, Some(15));
/// let keys: Vec<_> = page.rows.map(|r| r.unwrap().key).collect();
/// assert_eq!(keys.first(), Some(&RowKey::Position(10)));
/// assert_eq!(keys.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ArraySource<'a> {
	rows: Cow<'a, [Row]>,
}

impl<'a> ArraySource<'a> {
	pub fn new(rows: impl Into<Cow<'a, [Row]>>) -> Self {
		Self { rows: rows.into() }
	}

	/// Builds a source out of JSON objects or arrays.
	///
	/// # Errors
	///
	/// Returns [`TableError::Data`](crate::TableError::Data) for an item
	/// that is neither.
	pub fn from_json(items: Vec<Value>) -> TableResult<ArraySource<'static>> {
		let rows = items
			.into_iter()
			.map(Row::from_json)
			.collect::<TableResult<Vec<_>>>()?;
		Ok(ArraySource::new(rows))
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}

impl DataSource for ArraySource<'_> {
	fn kind(&self) -> &'static str {
		"array"
	}

	fn obtain(&mut self, info: &PaginationInfo, rowkey_column: Option<&str>) -> TableResult<SourcePage<'_>> {
		let filter = RowFilter::compile(info)?;
		let rows: &[Row] = &self.rows;

		let mut matched: Vec<(usize, &Row)> = rows
			.iter()
			.enumerate()
			.filter(|(_, row)| filter.matches(row))
			.collect();
		let total_rows = matched.len();

		sort_rows(&mut matched, &info.sort_keys(), info.multi_sort());

		tracing::debug!(
			source = "array",
			rows = rows.len(),
			filtered = total_rows,
			offset = info.offset(),
			limit = info.limit(),
			"obtaining page"
		);

		let window = Window::new(matched.into_iter().map(Ok), info)
			.map(|item| item.map(|(i, row)| KeyedRow::positional(i, row.clone())));
		Ok(SourcePage::new(Box::new(window), Some(total_rows), rowkey_column))
	}

	fn materialize_all(&mut self) -> TableResult<Vec<Row>> {
		Ok(self.rows.to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::TableError;
	use crate::row::RowKey;
	use crate::search::SearchDirective;
	use crate::sorting::{MultiSortStrategy, SortDirection};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn fruit() -> Vec<Row> {
		[("pear", 3), ("apple", 12), ("fig", 7), ("plum", 3), ("grape", 40)]
			.into_iter()
			.map(|(name, qty)| Row::from_iter([("name", json!(name)), ("qty", json!(qty))]))
			.collect()
	}

	fn names(page: SourcePage<'_>) -> Vec<String> {
		page.collect_rows()
			.unwrap()
			.into_iter()
			.map(|k| k.row.get("name").unwrap().as_str().unwrap().to_string())
			.collect()
	}

	#[rstest]
	fn test_filter_counts_before_window(fruit: Vec<Row>) {
		// Arrange
		let mut source = ArraySource::new(fruit);
		let info = PaginationInfo::new(1, 0).with_search("name", SearchDirective::like("R"));

		// Act
		let page = source.obtain(&info, None).unwrap();

		// Assert
		assert_eq!(page.total_rows, Some(2));
		assert_eq!(names(page), vec!["pear"]);
	}

	#[rstest]
	fn test_sort_keeps_source_positions(fruit: Vec<Row>) {
		let mut source = ArraySource::new(&fruit[..]);
		let info = PaginationInfo::new(0, 0).with_sort("qty", SortDirection::Descending);

		let keys: Vec<_> = source
			.obtain(&info, None)
			.unwrap()
			.collect_rows()
			.unwrap()
			.into_iter()
			.map(|k| k.key)
			.collect();

		assert_eq!(
			keys,
			[4, 1, 2, 0, 3].map(RowKey::Position).to_vec()
		);
	}

	#[rstest]
	fn test_combined_multi_sort(fruit: Vec<Row>) {
		let mut source = ArraySource::new(fruit);
		let info = PaginationInfo::new(0, 0)
			.with_sort("qty", SortDirection::Ascending)
			.with_sort("name", SortDirection::Descending)
			.with_multi_sort(MultiSortStrategy::Combined);

		let page = source.obtain(&info, None).unwrap();
		assert_eq!(names(page), vec!["plum", "pear", "fig", "apple", "grape"]);
	}

	#[rstest]
	fn test_mixed_product_codes_sort_text_before_numbers() {
		let rows: Vec<Row> = [json!(2), json!("10"), json!("1a"), json!("7"), json!("b2")]
			.into_iter()
			.map(|code| Row::from_iter([("name", code)]))
			.collect();
		let mut source = ArraySource::new(&rows[..]);
		let info = PaginationInfo::new(0, 0).with_sort("name", SortDirection::Ascending);

		let keys: Vec<_> = source
			.obtain(&info, None)
			.unwrap()
			.collect_rows()
			.unwrap()
			.into_iter()
			.map(|k| k.key)
			.collect();

		assert_eq!(keys, [2, 4, 0, 3, 1].map(RowKey::Position).to_vec());
	}

	#[rstest]
	fn test_offset_past_end_is_empty(fruit: Vec<Row>) {
		let mut source = ArraySource::new(fruit);
		let page = source.obtain(&PaginationInfo::new(2, 10), None).unwrap();
		assert_eq!(page.total_rows, Some(5));
		assert!(page.collect_rows().unwrap().is_empty());
	}

	#[rstest]
	fn test_rowkey_column(fruit: Vec<Row>) {
		let mut source = ArraySource::new(fruit);
		let map = source
			.obtain(&PaginationInfo::new(2, 0), Some("name"))
			.unwrap()
			.rows
			.into_map()
			.unwrap();
		assert_eq!(
			map.keys().cloned().collect::<Vec<_>>(),
			vec![RowKey::Value("pear".into()), RowKey::Value("apple".into())]
		);
	}

	#[rstest]
	fn test_from_json_rejects_scalars() {
		let err = ArraySource::from_json(vec![json!({"a": 1}), json!(3)]).unwrap_err();
		assert!(matches!(err, TableError::Data(_)));
	}

	#[rstest]
	fn test_materialize_all_ignores_window(fruit: Vec<Row>) {
		let mut source = ArraySource::new(fruit.clone());
		assert_eq!(source.materialize_all().unwrap(), fruit);
	}
}
