//! Base queries that filter, sort and window directives are merged into.

use super::scanner::{Keyword, scan};
use super::writer::SqlWriter;
use crate::error::{TableError, TableResult};
use crate::sorting::SortDirection;

/// A query that accepts structured directives and renders SQL text.
///
/// Implement it to plug in a different query builder. Column arguments
/// arrive already quoted for the target dialect.
pub trait SqlQuery: Clone {
	/// Query counting the rows the filtered query returns, ignoring order
	/// and window.
	fn count_variant(&self) -> Self;

	/// Adds a predicate, ANDed with any existing ones.
	fn with_where(self, predicate: String) -> Self;

	/// Adds a sort key after the ones already added.
	fn with_order(self, column: String, direction: SortDirection) -> Self;

	/// Restricts the result to `rowcount` rows starting at `offset`.
	fn with_limit(self, offset: usize, rowcount: usize) -> Self;

	/// Whether the query carries a LIMIT already.
	fn has_limit(&self) -> bool;

	fn to_sql(&self) -> String;
}

/// Alias of the derived table when a base query has to be wrapped.
const BASE_ALIAS: &str = "base_query";
/// Alias of the derived table inside a count query.
const COUNT_ALIAS: &str = "count_source";

/// A plain-text SELECT split into the parts directives touch.
///
/// The base query is split at its top-level WHERE, ORDER BY and
/// LIMIT/OFFSET/FETCH. A base with top-level GROUP BY, HAVING or a set
/// operator is wrapped as a derived table first, so added predicates
/// filter its result rows.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{SelectQuery, SortDirection, SqlQuery};
///
/// let query = SelectQuery::parse("SELECT * FROM users WHERE active = 1 ORDER BY id")
/// 	.unwrap()
/// 	.with_where("name LIKE '%al%'".to_string())
/// 	.with_order("name".to_string(), SortDirection::Descending)
/// 	.with_limit(20, 10);
///
/// assert_eq!(
/// 	query.to_sql(),
/// 	"SELECT * FROM users WHERE (active = 1) AND (name LIKE '%al%') \
/// 	 ORDER BY name DESC, id LIMIT 10 OFFSET 20"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
	head: String,
	conditions: Vec<String>,
	orders: Vec<String>,
	base_order: Option<String>,
	limit: Option<(usize, usize)>,
	base_limit: Option<String>,
}

impl SelectQuery {
	/// Splits `sql` into its clauses.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] on the `query` field when the text
	/// is not a SELECT (or WITH) statement, or is malformed.
	pub fn parse(sql: &str) -> TableResult<Self> {
		let sql = sql.trim().trim_end_matches(';').trim_end();
		let first_word = sql.split_whitespace().next().unwrap_or("");
		if !(first_word.eq_ignore_ascii_case("SELECT") || first_word.eq_ignore_ascii_case("WITH")) {
			return Err(TableError::validation("query", "base query must be a SELECT statement"));
		}

		let clauses = scan(sql)?;
		let order = clauses.iter().find(|c| c.keyword == Keyword::OrderBy);
		let window = clauses
			.iter()
			.find(|c| matches!(c.keyword, Keyword::Limit | Keyword::Offset | Keyword::Fetch));

		let body_end = [order.map(|c| c.start), window.map(|c| c.start)]
			.into_iter()
			.flatten()
			.min()
			.unwrap_or(sql.len());
		let body = sql[..body_end].trim_end();

		let base_order = order.map(|c| {
			let end = window.filter(|w| w.start > c.start).map_or(sql.len(), |w| w.start);
			sql[c.body..end].trim().to_string()
		});
		let base_limit = window.map(|w| {
			let end = order.filter(|o| o.start > w.start).map_or(sql.len(), |o| o.start);
			sql[w.start..end].trim().to_string()
		});

		let needs_wrapping = clauses.iter().any(|c| {
			c.start < body_end
				&& matches!(c.keyword, Keyword::GroupBy | Keyword::Having | Keyword::SetOperator)
		});
		let where_clause = clauses
			.iter()
			.find(|c| c.keyword == Keyword::Where && c.start < body_end);

		let (head, conditions) = match where_clause {
			_ if needs_wrapping => (format!("SELECT * FROM ({body}) AS {BASE_ALIAS}"), Vec::new()),
			Some(clause) => (
				sql[..clause.start].trim_end().to_string(),
				vec![sql[clause.body..body_end].trim().to_string()],
			),
			None => (body.to_string(), Vec::new()),
		};

		Ok(Self {
			head,
			conditions,
			orders: Vec::new(),
			base_order,
			limit: None,
			base_limit,
		})
	}

	/// Predicates in the order they will be ANDed.
	pub fn conditions(&self) -> &[String] {
		&self.conditions
	}

	fn write_conditions(&self, writer: &mut SqlWriter) {
		match self.conditions.as_slice() {
			[] => {}
			[single] => {
				writer.push_keyword("WHERE");
				writer.push_clause(single);
			}
			many => {
				writer.push_keyword("WHERE");
				writer.push_space();
				writer.push_list(many, " AND ", |w, condition| {
					w.push("(");
					w.push(condition);
					w.push(")");
				});
			}
		}
	}
}

impl SqlQuery for SelectQuery {
	fn count_variant(&self) -> Self {
		// A base LIMIT bounds the rows that exist, and with it the order
		// that picks them.
		let inner = Self {
			orders: Vec::new(),
			limit: None,
			base_order: self.base_limit.as_ref().and(self.base_order.clone()),
			..self.clone()
		};
		Self {
			head: format!("SELECT COUNT(*) FROM ({}) AS {COUNT_ALIAS}", inner.to_sql()),
			conditions: Vec::new(),
			orders: Vec::new(),
			base_order: None,
			limit: None,
			base_limit: None,
		}
	}

	fn with_where(mut self, predicate: String) -> Self {
		self.conditions.push(predicate);
		self
	}

	fn with_order(mut self, column: String, direction: SortDirection) -> Self {
		self.orders.push(format!("{column} {}", direction.sql_keyword()));
		self
	}

	fn with_limit(mut self, offset: usize, rowcount: usize) -> Self {
		self.limit = Some((offset, rowcount));
		self
	}

	fn has_limit(&self) -> bool {
		self.limit.is_some() || self.base_limit.is_some()
	}

	fn to_sql(&self) -> String {
		let mut writer = SqlWriter::new();
		writer.push(&self.head);
		self.write_conditions(&mut writer);

		let orders = self.orders.iter().chain(self.base_order.as_ref());
		if !self.orders.is_empty() || self.base_order.is_some() {
			writer.push_keyword("ORDER BY");
			writer.push_space();
			writer.push_list(orders, ", ", |w, order| w.push(order));
		}

		match (&self.limit, &self.base_limit) {
			(Some((offset, rowcount)), _) => {
				writer.push_keyword(&format!("LIMIT {rowcount} OFFSET {offset}"));
			}
			(None, Some(base_limit)) => writer.push_clause(base_limit),
			(None, None) => {}
		}
		writer.into_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("SELECT * FROM t", "SELECT * FROM t")]
	#[case("SELECT * FROM t;", "SELECT * FROM t")]
	#[case("SELECT * FROM t WHERE a = 1", "SELECT * FROM t WHERE a = 1")]
	#[case("select * from t order by a desc limit 5", "select * from t ORDER BY a desc limit 5")]
	#[case(
		"SELECT a, COUNT(*) AS n FROM t GROUP BY a",
		"SELECT * FROM (SELECT a, COUNT(*) AS n FROM t GROUP BY a) AS base_query"
	)]
	fn test_parse_round_trips(#[case] sql: &str, #[case] expected: &str) {
		assert_eq!(SelectQuery::parse(sql).unwrap().to_sql(), expected);
	}

	#[rstest]
	fn test_added_predicates_are_anded_with_base() {
		let query = SelectQuery::parse("SELECT * FROM t WHERE a = 1 OR b = 2")
			.unwrap()
			.with_where("c > 3".to_string());
		assert_eq!(query.to_sql(), "SELECT * FROM t WHERE (a = 1 OR b = 2) AND (c > 3)");
	}

	#[rstest]
	fn test_client_order_precedes_base_order() {
		let query = SelectQuery::parse("SELECT * FROM t ORDER BY id")
			.unwrap()
			.with_order("name".to_string(), SortDirection::Ascending)
			.with_order("age".to_string(), SortDirection::Descending);
		assert_eq!(query.to_sql(), "SELECT * FROM t ORDER BY name ASC, age DESC, id");
	}

	#[rstest]
	fn test_grouped_query_is_filtered_on_its_result() {
		let query = SelectQuery::parse("SELECT dept, COUNT(*) AS n FROM staff GROUP BY dept HAVING COUNT(*) > 1")
			.unwrap()
			.with_where("n > 5".to_string());
		assert_eq!(
			query.to_sql(),
			"SELECT * FROM (SELECT dept, COUNT(*) AS n FROM staff GROUP BY dept HAVING COUNT(*) > 1) AS base_query WHERE n > 5"
		);
	}

	#[rstest]
	fn test_union_keeps_trailing_order_outside() {
		let query = SelectQuery::parse("SELECT a FROM t UNION SELECT a FROM u ORDER BY a").unwrap();
		assert_eq!(
			query.to_sql(),
			"SELECT * FROM (SELECT a FROM t UNION SELECT a FROM u) AS base_query ORDER BY a"
		);
	}

	#[rstest]
	fn test_count_variant_drops_order_and_window() {
		let query = SelectQuery::parse("SELECT * FROM t ORDER BY id")
			.unwrap()
			.with_where("name LIKE '%abc%'".to_string())
			.with_order("name".to_string(), SortDirection::Ascending)
			.with_limit(10, 10);
		assert_eq!(
			query.count_variant().to_sql(),
			"SELECT COUNT(*) FROM (SELECT * FROM t WHERE name LIKE '%abc%') AS count_source"
		);
	}

	#[rstest]
	fn test_count_variant_keeps_base_limit() {
		let query = SelectQuery::parse("SELECT * FROM t ORDER BY score DESC LIMIT 100").unwrap();
		assert!(query.has_limit());
		assert_eq!(
			query.count_variant().to_sql(),
			"SELECT COUNT(*) FROM (SELECT * FROM t ORDER BY score DESC LIMIT 100) AS count_source"
		);
	}

	#[rstest]
	fn test_has_limit() {
		let query = SelectQuery::parse("SELECT * FROM t").unwrap();
		assert!(!query.has_limit());
		assert!(query.with_limit(0, 5).has_limit());
		assert!(SelectQuery::parse("SELECT * FROM t OFFSET 5").unwrap().has_limit());
	}

	#[rstest]
	#[case("UPDATE t SET a = 1")]
	#[case("")]
	#[case("SELECT 'unterminated")]
	fn test_parse_rejects(#[case] sql: &str) {
		assert!(matches!(
			SelectQuery::parse(sql),
			Err(TableError::Validation { .. })
		));
	}
}
