//! SQL backend: directives become query text, an executor runs it.
//!
//! Nothing is filtered or sorted in memory here. Search directives become
//! WHERE predicates, the sort order becomes ORDER BY and the window becomes
//! LIMIT/OFFSET. The post-filter count comes from a COUNT(*) variant of the
//! filtered query, run before the page query.

mod dialect;
mod query;
mod scanner;
mod writer;

pub use dialect::SqlDialect;
pub use query::{SelectQuery, SqlQuery};

use super::{DataSource, SourcePage};
use crate::error::{TableError, TableResult};
use crate::pagination::PaginationInfo;
use crate::row::{KeyedRow, Row};

/// Runs query text against a database. Connections, retries and timeouts
/// are the implementor's business.
pub trait SqlExecutor {
	/// Runs a `SELECT COUNT(*)` query and returns the count.
	fn fetch_count(&mut self, sql: &str) -> TableResult<usize>;

	/// Runs a query and returns its rows in order.
	fn fetch_rows(&mut self, sql: &str) -> TableResult<Vec<Row>>;
}

impl<E: SqlExecutor + ?Sized> SqlExecutor for &mut E {
	fn fetch_count(&mut self, sql: &str) -> TableResult<usize> {
		(**self).fetch_count(sql)
	}

	fn fetch_rows(&mut self, sql: &str) -> TableResult<Vec<Row>> {
		(**self).fetch_rows(sql)
	}
}

/// The two queries one page needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlPlan<Q> {
	/// Counts the filtered rows.
	pub count: Q,
	/// Fetches the sorted window.
	pub page: Q,
}

/// Backend over a base query and an [`SqlExecutor`].
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{PaginationInfo, SearchDirective, SelectQuery, SqlQuery, SqlSource};
/// # use reinhardt_tables::{Row, SqlExecutor, TableResult};
/// # struct NoDatabase;
/// # impl SqlExecutor for NoDatabase {
/// # 	fn fetch_count(&mut self, _: &str) -> TableResult<usize> { Ok(0) }
/// # 	fn fetch_rows(&mut self, _: &str) -> TableResult<Vec<Row>> { Ok(Vec::new()) }
/// # }
///
/// let source = SqlSource::new(SelectQuery::parse("SELECT * FROM t").unwrap(), NoDatabase);
/// let info = PaginationInfo::new(10, 0).with_search("name", SearchDirective::like("abc"));
///
/// let plan = source.plan(&info).unwrap();
/// assert_eq!(plan.page.to_sql(), "SELECT * FROM t WHERE name LIKE '%abc%' LIMIT 10 OFFSET 0");
/// assert_eq!(
/// 	plan.count.to_sql(),
/// 	"SELECT COUNT(*) FROM (SELECT * FROM t WHERE name LIKE '%abc%') AS count_source"
/// );
/// ```
#[derive(Debug)]
pub struct SqlSource<Q, E> {
	query: Q,
	executor: E,
	dialect: SqlDialect,
}

impl<Q: SqlQuery, E: SqlExecutor> SqlSource<Q, E> {
	pub fn new(query: Q, executor: E) -> Self {
		Self {
			query,
			executor,
			dialect: SqlDialect::default(),
		}
	}

	pub fn dialect(mut self, dialect: SqlDialect) -> Self {
		self.dialect = dialect;
		self
	}

	/// Builds the count and page queries without running them.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] when the base query already has a
	/// LIMIT and a window is requested, for column names that are not
	/// plain identifiers, and for non-numeric parameters on numeric
	/// columns.
	pub fn plan(&self, info: &PaginationInfo) -> TableResult<SqlPlan<Q>> {
		if info.limit() > 0 && self.query.has_limit() {
			return Err(TableError::validation(
				"query",
				"base query already has a LIMIT clause and cannot be paginated",
			));
		}

		let mut filtered = self.query.clone();
		for (column, directive) in info.active_searches() {
			let predicate = self.dialect.predicate(column, directive, info.comparison(column))?;
			filtered = filtered.with_where(predicate);
		}
		let count = filtered.count_variant();

		let mut page = filtered;
		for (column, direction) in info.sorting_order() {
			page = page.with_order(self.dialect.quote_identifier(column)?, *direction);
		}
		if info.limit() > 0 {
			page = page.with_limit(info.offset(), info.limit());
		}
		Ok(SqlPlan { count, page })
	}

	pub fn into_parts(self) -> (Q, E) {
		(self.query, self.executor)
	}
}

impl<Q: SqlQuery, E: SqlExecutor> DataSource for SqlSource<Q, E> {
	fn kind(&self) -> &'static str {
		"sql"
	}

	fn obtain(&mut self, info: &PaginationInfo, rowkey_column: Option<&str>) -> TableResult<SourcePage<'_>> {
		let SqlPlan { count, page } = self.plan(info)?;
		let (count_sql, page_sql) = (count.to_sql(), page.to_sql());
		tracing::debug!(sql = %count_sql, "counting rows");
		let total_rows = self.executor.fetch_count(&count_sql)?;

		tracing::debug!(sql = %page_sql, filtered = total_rows, "fetching page");
		let offset = info.offset();
		let rows = self
			.executor
			.fetch_rows(&page_sql)?
			.into_iter()
			.enumerate()
			.map(move |(i, row)| Ok::<_, TableError>(KeyedRow::positional(offset + i, row)));
		Ok(SourcePage::new(Box::new(rows), Some(total_rows), rowkey_column))
	}

	fn materialize_all(&mut self) -> TableResult<Vec<Row>> {
		Err(TableError::Unsupported(
			"the SQL backend only loads filtered, windowed pages".to_string(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use crate::search::SearchDirective;
	use crate::sorting::SortDirection;
	use crate::value::ComparisonMode;
	use rstest::rstest;
	use serde_json::json;

	#[derive(Default)]
	struct Recorder {
		count: usize,
		rows: Vec<Row>,
		executed: Vec<String>,
	}

	impl SqlExecutor for Recorder {
		fn fetch_count(&mut self, sql: &str) -> TableResult<usize> {
			self.executed.push(sql.to_string());
			Ok(self.count)
		}

		fn fetch_rows(&mut self, sql: &str) -> TableResult<Vec<Row>> {
			self.executed.push(sql.to_string());
			Ok(self.rows.clone())
		}
	}

	fn source(sql: &str, executor: Recorder) -> SqlSource<SelectQuery, Recorder> {
		SqlSource::new(SelectQuery::parse(sql).unwrap(), executor)
	}

	#[rstest]
	fn test_count_runs_before_page() {
		// Arrange
		let executor = Recorder {
			count: 42,
			rows: vec![Row::from_iter([("id", json!(21))]), Row::from_iter([("id", json!(22))])],
			..Recorder::default()
		};
		let mut source = source("SELECT * FROM t", executor);
		let info = PaginationInfo::new(2, 20).with_sort("id", SortDirection::Ascending);

		// Act
		let page = source.obtain(&info, None).unwrap();
		let total_rows = page.total_rows;
		let keys: Vec<_> = page.collect_rows().unwrap().into_iter().map(|k| k.key).collect();

		// Assert
		assert_eq!(total_rows, Some(42));
		assert_eq!(keys, [20, 21].map(crate::row::RowKey::Position).to_vec());
		let (_, executor) = source.into_parts();
		assert_eq!(
			executor.executed,
			vec![
				"SELECT COUNT(*) FROM (SELECT * FROM t) AS count_source".to_string(),
				"SELECT * FROM t ORDER BY id ASC LIMIT 2 OFFSET 20".to_string(),
			]
		);
	}

	#[rstest]
	fn test_base_limit_conflicts_with_window() {
		let mut source = source("SELECT * FROM t LIMIT 5", Recorder::default());
		let err = source.obtain(&PaginationInfo::new(10, 0), None).unwrap_err();
		assert!(matches!(err, TableError::Validation { ref field, .. } if field == "query"));
		assert!(source.into_parts().1.executed.is_empty());
	}

	#[rstest]
	fn test_base_limit_allowed_without_window() {
		let source = source("SELECT * FROM t LIMIT 5", Recorder::default());
		let plan = source.plan(&PaginationInfo::new(0, 0)).unwrap();
		assert_eq!(plan.page.to_sql(), "SELECT * FROM t LIMIT 5");
	}

	#[rstest]
	fn test_multi_column_order_and_dialect() {
		let source = source("SELECT * FROM t", Recorder::default()).dialect(SqlDialect::Postgres);
		let info = PaginationInfo::new(0, 0)
			.with_sort("last_name", SortDirection::Ascending)
			.with_sort("age", SortDirection::Descending)
			.with_search("age", SearchDirective::greater_than("30"))
			.with_comparison("age", ComparisonMode::Numeric)
			.with_search("city", SearchDirective::equal(""));
		let plan = source.plan(&info).unwrap();
		assert_eq!(
			plan.page.to_sql(),
			"SELECT * FROM t WHERE \"age\" > 30 ORDER BY \"last_name\" ASC, \"age\" DESC"
		);
	}

	#[rstest]
	fn test_bad_sort_column_is_rejected() {
		let source = source("SELECT * FROM t", Recorder::default());
		let info = PaginationInfo::new(0, 0).with_sort("id; DROP TABLE t", SortDirection::Ascending);
		assert!(matches!(source.plan(&info), Err(TableError::Validation { .. })));
	}

	#[rstest]
	fn test_materialize_all_is_unsupported() {
		let mut source = source("SELECT * FROM t", Recorder::default());
		assert_eq!(source.materialize_all().unwrap_err().kind(), ErrorKind::Unsupported);
	}

	#[rstest]
	fn test_executor_by_reference() {
		let mut executor = Recorder::default();
		{
			let mut source = SqlSource::new(SelectQuery::parse("SELECT * FROM t").unwrap(), &mut executor);
			source.obtain(&PaginationInfo::new(5, 0), None).unwrap();
		}
		assert_eq!(executor.executed.len(), 2);
	}
}
