use super::{DataSource, RowSequence, SourcePage, Window};
use crate::error::TableResult;
use crate::filter::RowFilter;
use crate::pagination::PaginationInfo;
use crate::row::{KeyedRow, Row};
use crate::sorting::sort_rows;
use serde_json::Value;
use std::marker::PhantomData;

/// One forward-only pass over a [`RowSource`].
pub type RowIter<'a> = Box<dyn Iterator<Item = TableResult<Row>> + 'a>;

/// An external, restartable sequence of rows.
///
/// Only [`rows`](Self::rows) is required. The other methods are optional
/// capabilities with conservative defaults; override them when the source
/// can answer more cheaply than a full pass.
pub trait RowSource {
	/// Starts a fresh pass from the first row.
	fn rows(&mut self) -> TableResult<RowIter<'_>>;

	/// Number of rows, when known without a pass.
	fn count(&mut self) -> Option<usize> {
		None
	}

	/// Rows `[offset, offset + limit)` of an unfiltered, unsorted pass.
	///
	/// The default skips and takes over [`rows`](Self::rows). Sources with
	/// random access should jump straight to `offset`.
	fn slice(&mut self, offset: usize, limit: usize) -> TableResult<RowIter<'_>> {
		Ok(Box::new(self.rows()?.skip(offset).take(limit)))
	}
}

/// Item types a [`FnRowSource`] accepts.
pub trait IntoRow {
	fn into_row(self) -> TableResult<Row>;
}

impl IntoRow for Row {
	fn into_row(self) -> TableResult<Row> {
		Ok(self)
	}
}

impl IntoRow for Value {
	fn into_row(self) -> TableResult<Row> {
		Row::from_json(self)
	}
}

impl<T: IntoRow> IntoRow for TableResult<T> {
	fn into_row(self) -> TableResult<Row> {
		self.and_then(IntoRow::into_row)
	}
}

/// A [`RowSource`] that calls a closure for every pass.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{FnRowSource, RowSource};
/// use serde_json::json;
///
/// let data = vec![json!({"id": 1}), json!({"id": 2})];
/// let mut source = FnRowSource::new(|| data.iter().cloned()).with_count(data.len());
///
/// assert_eq!(source.count(), Some(2));
/// assert_eq!(source.rows().unwrap().count(), 2);
/// ```
pub struct FnRowSource<'a, F> {
	make: F,
	count: Option<usize>,
	_borrow: PhantomData<&'a ()>,
}

impl<'a, F, I> FnRowSource<'a, F>
where
	F: FnMut() -> I,
	I: IntoIterator,
	I::IntoIter: 'a,
	I::Item: IntoRow + 'a,
{
	pub fn new(make: F) -> Self {
		Self {
			make,
			count: None,
			_borrow: PhantomData,
		}
	}

	/// Declares the row count, enabling the count capability.
	pub fn with_count(mut self, count: usize) -> Self {
		self.count = Some(count);
		self
	}
}

impl<'a, F, I> RowSource for FnRowSource<'a, F>
where
	F: FnMut() -> I,
	I: IntoIterator,
	I::IntoIter: 'a,
	I::Item: IntoRow + 'a,
{
	fn rows(&mut self) -> TableResult<RowIter<'_>> {
		Ok(Box::new((self.make)().into_iter().map(IntoRow::into_row)))
	}

	fn count(&mut self) -> Option<usize> {
		self.count
	}
}

impl<F> std::fmt::Debug for FnRowSource<'_, F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FnRowSource")
			.field("count", &self.count)
			.finish_non_exhaustive()
	}
}

/// Backend over an external [`RowSource`].
///
/// Streams whenever it can. Filtering wraps the pass in a predicate, and
/// the post-filter count costs one extra pass. Sorting needs every row at
/// once, so it drains the source into memory first; the result is then a
/// single in-memory pass. Without filters the row count comes from
/// [`RowSource::count`] and may be unknown, and the window is delegated to
/// [`RowSource::slice`].
#[derive(Debug)]
pub struct IteratorSource<S> {
	source: S,
}

impl<S: RowSource> IteratorSource<S> {
	pub fn new(source: S) -> Self {
		Self { source }
	}

	pub fn into_inner(self) -> S {
		self.source
	}

	fn count_matching(&mut self, filter: &RowFilter) -> TableResult<usize> {
		let mut matching = 0;
		for row in self.source.rows()? {
			if filter.matches(&row?) {
				matching += 1;
			}
		}
		Ok(matching)
	}

	fn obtain_sorted(&mut self, info: &PaginationInfo, filter: RowFilter) -> TableResult<(RowSequence<'_>, usize)> {
		tracing::warn!(
			sort_columns = info.sorting_order().len(),
			"draining row source into memory to sort"
		);
		let mut matched = Vec::new();
		for (index, row) in self.source.rows()?.enumerate() {
			let row = row?;
			if filter.matches(&row) {
				matched.push((index, row));
			}
		}
		let total_rows = matched.len();
		sort_rows(&mut matched, &info.sort_keys(), info.multi_sort());

		let window: RowSequence<'_> = Box::new(
			Window::new(matched.into_iter().map(Ok), info)
				.map(|item| item.map(|(index, row)| KeyedRow::positional(index, row))),
		);
		Ok((window, total_rows))
	}
}

impl<S: RowSource> DataSource for IteratorSource<S> {
	fn kind(&self) -> &'static str {
		"iterator"
	}

	fn obtain(&mut self, info: &PaginationInfo, rowkey_column: Option<&str>) -> TableResult<SourcePage<'_>> {
		let filter = RowFilter::compile(info)?;

		let (rows, total_rows) = if !info.sorting_order().is_empty() {
			let (rows, total_rows) = self.obtain_sorted(info, filter)?;
			(rows, Some(total_rows))
		} else if filter.is_empty() {
			let total_rows = self.source.count();
			let offset = info.offset();
			let pass = if info.limit() == 0 {
				self.source.rows()?
			} else {
				self.source.slice(offset, info.limit())?
			};
			let rows: RowSequence<'_> = Box::new(
				pass.enumerate()
					.map(move |(i, row)| row.map(|row| KeyedRow::positional(offset + i, row))),
			);
			(rows, total_rows)
		} else {
			let total_rows = self.count_matching(&filter)?;
			let matching = self
				.source
				.rows()?
				.enumerate()
				.filter(move |(_, row)| row.as_ref().map_or(true, |row| filter.matches(row)))
				.map(|(index, row)| row.map(|row| KeyedRow::positional(index, row)));
			let rows: RowSequence<'_> = Box::new(Window::new(matching, info));
			(rows, Some(total_rows))
		};

		tracing::debug!(
			source = "iterator",
			filtered = ?total_rows,
			offset = info.offset(),
			limit = info.limit(),
			"obtaining page"
		);
		Ok(SourcePage::new(rows, total_rows, rowkey_column))
	}

	fn materialize_all(&mut self) -> TableResult<Vec<Row>> {
		self.source.rows()?.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::row::RowKey;
	use crate::search::SearchDirective;
	use crate::sorting::SortDirection;
	use rstest::rstest;
	use crate::error::TableError;
	use serde_json::json;

	fn numbers(n: usize) -> Vec<Value> {
		(0..n).map(|i| json!({"n": i})).collect()
	}

	fn values(page: SourcePage<'_>) -> Vec<u64> {
		page.collect_rows()
			.unwrap()
			.into_iter()
			.map(|k| k.row.get("n").unwrap().as_u64().unwrap())
			.collect()
	}

	/// Counts passes and records slice requests.
	struct Probe {
		data: Vec<Value>,
		passes: usize,
		sliced: Option<(usize, usize)>,
	}

	impl RowSource for Probe {
		fn rows(&mut self) -> TableResult<RowIter<'_>> {
			self.passes += 1;
			Ok(Box::new(self.data.iter().cloned().map(Row::from_json)))
		}

		fn count(&mut self) -> Option<usize> {
			Some(self.data.len())
		}

		fn slice(&mut self, offset: usize, limit: usize) -> TableResult<RowIter<'_>> {
			self.sliced = Some((offset, limit));
			Ok(Box::new(
				self.data[offset.min(self.data.len())..]
					.iter()
					.take(limit)
					.cloned()
					.map(Row::from_json),
			))
		}
	}

	fn probe(n: usize) -> Probe {
		Probe {
			data: numbers(n),
			passes: 0,
			sliced: None,
		}
	}

	#[rstest]
	fn test_unknown_count_without_count_capability() {
		let data = numbers(5);
		let mut source = IteratorSource::new(FnRowSource::new(|| data.iter().cloned()));
		let page = source.obtain(&PaginationInfo::new(2, 2), None).unwrap();
		assert_eq!(page.total_rows, None);
		assert_eq!(values(page), vec![2, 3]);
	}

	#[rstest]
	fn test_unfiltered_window_uses_slice_capability() {
		let mut source = IteratorSource::new(probe(10));
		let page = source.obtain(&PaginationInfo::new(3, 6), None).unwrap();
		assert_eq!(page.total_rows, Some(10));
		let keys: Vec<_> = page.collect_rows().unwrap().into_iter().map(|k| k.key).collect();
		assert_eq!(keys, [6, 7, 8].map(RowKey::Position).to_vec());
		assert_eq!(source.into_inner().sliced, Some((6, 3)));
	}

	#[rstest]
	fn test_filter_counts_with_second_pass() {
		let mut source = IteratorSource::new(probe(20));
		let info = PaginationInfo::new(2, 2).with_search("n", SearchDirective::greater_equal("10"));

		let page = source.obtain(&info, None).unwrap();
		assert_eq!(page.total_rows, Some(10));
		let keys: Vec<_> = page.collect_rows().unwrap().into_iter().map(|k| k.key).collect();

		assert_eq!(keys, [12, 13].map(RowKey::Position).to_vec());
		let probe = source.into_inner();
		assert_eq!(probe.passes, 2);
		assert_eq!(probe.sliced, None);
	}

	#[rstest]
	fn test_sorting_drains_once() {
		let mut source = IteratorSource::new(probe(6));
		let info = PaginationInfo::new(4, 0).with_sort("n", SortDirection::Descending);

		let page = source.obtain(&info, None).unwrap();
		assert_eq!(page.total_rows, Some(6));
		assert_eq!(values(page), vec![5, 4, 3, 2]);
		assert_eq!(source.into_inner().passes, 1);
	}

	#[rstest]
	fn test_offset_beyond_end_is_empty() {
		let data = numbers(3);
		let mut source = IteratorSource::new(FnRowSource::new(|| data.iter().cloned()));
		let page = source.obtain(&PaginationInfo::new(5, 10), None).unwrap();
		assert!(values(page).is_empty());
	}

	#[rstest]
	fn test_bad_item_surfaces_as_data_error() {
		let mut source = IteratorSource::new(FnRowSource::new(|| vec![json!({"n": 0}), json!("scalar")]));
		let err = source
			.obtain(&PaginationInfo::new(0, 0), None)
			.unwrap()
			.collect_rows()
			.unwrap_err();
		assert!(matches!(err, TableError::Data(_)));
	}

	#[rstest]
	fn test_materialize_all_reads_everything() {
		let data = numbers(4);
		let mut source = IteratorSource::new(FnRowSource::new(|| data.iter().cloned()));
		assert_eq!(source.materialize_all().unwrap().len(), 4);
	}
}
