//! Data sources behind one contract: filter, count, sort, then window.
//!
//! Every backend applies the steps in that fixed order. Filtering comes
//! before counting so the reported row count describes the filtered set,
//! and sorting comes before windowing so the window cuts the final order.
//!
//! - [`ArraySource`]: rows resident in memory.
//! - [`IteratorSource`]: a restartable external [`RowSource`], streamed
//!   unless sorting forces it into memory.
//! - [`SqlSource`]: directives merged into a base query and executed by an
//!   external [`SqlExecutor`].

mod array;
mod iter;
pub mod sql;

pub use array::ArraySource;
pub use iter::{FnRowSource, IntoRow, IteratorSource, RowIter, RowSource};
pub use sql::{SelectQuery, SqlDialect, SqlExecutor, SqlQuery, SqlSource};

use crate::error::TableResult;
use crate::pagination::PaginationInfo;
use crate::row::{KeyedRow, Row};
use crate::rowkey::RowKeyProjection;

/// Lazy sequence of keyed rows for one page.
pub type RowSequence<'a> = Box<dyn Iterator<Item = TableResult<KeyedRow>> + 'a>;

/// Rows of one window plus the post-filter row count.
pub struct SourcePage<'a> {
	/// The window, re-keyed by the row-key column when one was given.
	pub rows: RowKeyProjection<RowSequence<'a>>,
	/// Rows matching the filters, `None` when the source cannot tell.
	pub total_rows: Option<usize>,
}

impl<'a> SourcePage<'a> {
	pub(crate) fn new(rows: RowSequence<'a>, total_rows: Option<usize>, rowkey_column: Option<&str>) -> Self {
		Self {
			rows: RowKeyProjection::new(rows, rowkey_column.map(str::to_string)),
			total_rows,
		}
	}

	/// Pulls the whole window, stopping at the first row error.
	pub fn collect_rows(self) -> TableResult<Vec<KeyedRow>> {
		self.rows.collect()
	}
}

impl std::fmt::Debug for SourcePage<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SourcePage")
			.field("rowkey_column", &self.rows.column())
			.field("total_rows", &self.total_rows)
			.finish_non_exhaustive()
	}
}

/// A backend that turns a [`PaginationInfo`] into one page of rows.
pub trait DataSource {
	/// Short backend name used in log events.
	fn kind(&self) -> &'static str;

	/// Filters, counts, sorts and windows the data as `info` describes.
	///
	/// `rowkey_column` names the column whose value keys each row. Without
	/// it rows are keyed by their index in the source.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`](crate::TableError::Validation)
	/// for directives the backend cannot apply, or any error the underlying
	/// data raises while it is read up front. Errors from rows read later
	/// surface from the returned sequence.
	fn obtain(&mut self, info: &PaginationInfo, rowkey_column: Option<&str>) -> TableResult<SourcePage<'_>>;

	/// Loads every row, ignoring filters and windows.
	///
	/// # Errors
	///
	/// Backends meant for windowed access only return
	/// [`TableError::Unsupported`](crate::TableError::Unsupported).
	fn materialize_all(&mut self) -> TableResult<Vec<Row>>;
}

/// Skips `offset` rows and then yields at most `limit` (`0` for no bound).
///
/// Errors pass through without counting toward the window, so a broken row
/// inside the skipped range is still reported.
pub(crate) struct Window<I> {
	inner: I,
	skip: usize,
	remaining: Option<usize>,
}

impl<I> Window<I> {
	pub(crate) fn new(inner: I, info: &PaginationInfo) -> Self {
		Self {
			inner,
			skip: info.offset(),
			remaining: (info.limit() > 0).then_some(info.limit()),
		}
	}
}

impl<I, T> Iterator for Window<I>
where
	I: Iterator<Item = TableResult<T>>,
{
	type Item = TableResult<T>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.remaining == Some(0) {
			return None;
		}
		loop {
			match self.inner.next()? {
				Err(error) => return Some(Err(error)),
				Ok(_) if self.skip > 0 => self.skip -= 1,
				Ok(item) => {
					if let Some(remaining) = self.remaining.as_mut() {
						*remaining -= 1;
					}
					return Some(Ok(item));
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::TableError;
	use rstest::rstest;

	fn window(items: Vec<TableResult<usize>>, limit: usize, offset: usize) -> Vec<TableResult<usize>> {
		Window::new(items.into_iter(), &PaginationInfo::new(limit, offset)).collect()
	}

	#[rstest]
	#[case(3, 0, vec![0, 1, 2])]
	#[case(3, 3, vec![3, 4])]
	#[case(3, 5, vec![])]
	#[case(3, 50, vec![])]
	#[case(0, 2, vec![0, 1, 2, 3, 4])]
	fn test_window_bounds(#[case] limit: usize, #[case] offset: usize, #[case] expected: Vec<usize>) {
		let items = (0..5).map(Ok).collect();
		let got: Vec<_> = window(items, limit, offset).into_iter().map(Result::unwrap).collect();
		assert_eq!(got, expected);
	}

	#[rstest]
	fn test_window_reports_errors_in_skipped_range() {
		let items = vec![Ok(0), Err(TableError::Data("broken".into())), Ok(2), Ok(3)];
		let got = window(items, 1, 2);
		assert_eq!(got, vec![Err(TableError::Data("broken".into())), Ok(3)]);
	}
}
