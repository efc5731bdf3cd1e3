//! Per-database rendering of identifiers, literals and search predicates.

use super::writer::SqlWriter;
use crate::error::{TableError, TableResult};
use crate::search::{SearchDirective, SearchType};
use crate::value::{ComparisonMode, parse_number};
use serde::{Deserialize, Serialize};

/// SQL flavour the generated text targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialect {
	/// Bare identifiers and ANSI operators.
	#[default]
	Generic,
	Postgres,
	MySql,
	Sqlite,
}

fn is_identifier_part(part: &str) -> bool {
	let mut chars = part.chars();
	chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl SqlDialect {
	/// Renders a column reference such as `name` or `t.name`.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] naming the column unless every
	/// dot-separated part is a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`).
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::SqlDialect;
	///
	/// assert_eq!(SqlDialect::Postgres.quote_identifier("t.name").unwrap(), "\"t\".\"name\"");
	/// assert_eq!(SqlDialect::MySql.quote_identifier("name").unwrap(), "`name`");
	/// assert_eq!(SqlDialect::Generic.quote_identifier("name").unwrap(), "name");
	/// assert!(SqlDialect::Generic.quote_identifier("name; DROP TABLE t").is_err());
	/// ```
	pub fn quote_identifier(self, column: &str) -> TableResult<String> {
		if !column.split('.').all(is_identifier_part) {
			return Err(TableError::validation(column, "not a valid column identifier"));
		}
		let quoted = column
			.split('.')
			.map(|part| match self {
				Self::Generic => part.to_string(),
				Self::Postgres | Self::Sqlite => format!("\"{part}\""),
				Self::MySql => format!("`{part}`"),
			})
			.collect::<Vec<_>>()
			.join(".");
		Ok(quoted)
	}

	/// Renders a string literal, doubling single quotes. MySQL also treats
	/// backslash as an escape character, so it is doubled there.
	pub fn quote_string(self, value: &str) -> String {
		let escaped = value.replace('\'', "''");
		match self {
			Self::MySql => format!("'{}'", escaped.replace('\\', "\\\\")),
			_ => format!("'{escaped}'"),
		}
	}

	fn like_operator(self) -> &'static str {
		match self {
			Self::Postgres => "ILIKE",
			_ => "LIKE",
		}
	}

	fn regex_operator(self) -> &'static str {
		match self {
			Self::Postgres => "~*",
			_ => "REGEXP",
		}
	}

	/// A comparison operand. Numeric columns take the number inline and
	/// refuse anything else; other modes compare against a string literal.
	fn operand(self, column: &str, param: &str, mode: ComparisonMode) -> TableResult<String> {
		let param = param.trim();
		match mode {
			ComparisonMode::Numeric => match parse_number(param) {
				Some(_) => Ok(param.to_string()),
				None => Err(TableError::validation(
					column,
					format!("{param:?} is not a number"),
				)),
			},
			ComparisonMode::Natural | ComparisonMode::Lexical => Ok(self.quote_string(param)),
		}
	}

	/// Renders one search directive as a WHERE predicate.
	///
	/// Inert directives are filtered out by the caller and never reach here.
	pub(crate) fn predicate(
		self,
		column: &str,
		directive: &SearchDirective,
		mode: ComparisonMode,
	) -> TableResult<String> {
		let mut writer = SqlWriter::new();
		writer.push(&self.quote_identifier(column)?);
		let param = directive.param();

		match directive.search_type() {
			SearchType::Like => {
				let (pattern, escaped) = like_pattern(param);
				writer.push_keyword(self.like_operator());
				writer.push_space();
				writer.push(&self.quote_string(&pattern));
				if escaped {
					writer.push_keyword("ESCAPE");
					writer.push_space();
					writer.push(&self.quote_string("\\"));
				}
			}
			SearchType::RegexLike => {
				writer.push_keyword(self.regex_operator());
				writer.push_space();
				writer.push(&self.quote_string(param));
			}
			SearchType::In => {
				let operands = directive
					.in_values()
					.into_iter()
					.map(|piece| self.operand(column, piece, mode))
					.collect::<TableResult<Vec<_>>>()?;
				writer.push_keyword("IN (");
				writer.push_list(operands, ", ", |w, operand| w.push(&operand));
				writer.push(")");
			}
			comparison => {
				let operator = match comparison {
					SearchType::LessThan => "<",
					SearchType::LessEqual => "<=",
					SearchType::GreaterThan => ">",
					SearchType::GreaterEqual => ">=",
					_ => "=",
				};
				writer.push_keyword(operator);
				writer.push_space();
				writer.push(&self.operand(column, param, mode)?);
			}
		}
		Ok(writer.into_string())
	}
}

/// Wraps `param` in `%` wildcards, escaping wildcards it contains.
/// The flag tells whether an `ESCAPE` clause is needed.
fn like_pattern(param: &str) -> (String, bool) {
	let mut pattern = String::with_capacity(param.len() + 2);
	let mut escaped = false;
	pattern.push('%');
	for c in param.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
			escaped = true;
		}
		pattern.push(c);
	}
	pattern.push('%');
	(pattern, escaped)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(SqlDialect::Generic, SearchDirective::like("abc"), "name LIKE '%abc%'")]
	#[case(SqlDialect::Postgres, SearchDirective::like("abc"), "\"name\" ILIKE '%abc%'")]
	#[case(SqlDialect::Generic, SearchDirective::like("50%_off"), "name LIKE '%50\\%\\_off%' ESCAPE '\\'")]
	#[case(SqlDialect::MySql, SearchDirective::like("a_b"), "`name` LIKE '%a\\\\_b%' ESCAPE '\\\\'")]
	#[case(SqlDialect::Generic, SearchDirective::like("O'Brien"), "name LIKE '%O''Brien%'")]
	#[case(SqlDialect::Postgres, SearchDirective::regex_like("^a.c"), "\"name\" ~* '^a.c'")]
	#[case(SqlDialect::Sqlite, SearchDirective::regex_like("^a"), "\"name\" REGEXP '^a'")]
	#[case(SqlDialect::Generic, SearchDirective::less_than("10"), "name < '10'")]
	#[case(SqlDialect::Generic, SearchDirective::greater_equal("b"), "name >= 'b'")]
	#[case(SqlDialect::Generic, SearchDirective::equal("x"), "name = 'x'")]
	#[case(SqlDialect::Generic, SearchDirective::one_of(["1", "2", "3"]), "name IN ('1', '2', '3')")]
	fn test_predicates(#[case] dialect: SqlDialect, #[case] directive: SearchDirective, #[case] expected: &str) {
		let sql = dialect.predicate("name", &directive, ComparisonMode::Natural).unwrap();
		assert_eq!(sql, expected);
	}

	#[rstest]
	fn test_numeric_mode_inlines_numbers() {
		let dialect = SqlDialect::Generic;
		assert_eq!(
			dialect.predicate("qty", &SearchDirective::greater_than("5"), ComparisonMode::Numeric).unwrap(),
			"qty > 5"
		);
		assert_eq!(
			dialect.predicate("qty", &SearchDirective::one_of(["1", " 2"]), ComparisonMode::Numeric).unwrap(),
			"qty IN (1, 2)"
		);
	}

	#[rstest]
	fn test_numeric_mode_rejects_text() {
		let err = SqlDialect::Generic
			.predicate("qty", &SearchDirective::equal("5 OR 1=1"), ComparisonMode::Numeric)
			.unwrap_err();
		assert!(matches!(err, TableError::Validation { ref field, .. } if field == "qty"));
	}

	#[rstest]
	#[case("name")]
	#[case("_private")]
	#[case("t.name")]
	#[case("schema.t.col_2")]
	fn test_valid_identifiers(#[case] column: &str) {
		assert!(SqlDialect::Postgres.quote_identifier(column).is_ok());
	}

	#[rstest]
	#[case("")]
	#[case("2name")]
	#[case("t.")]
	#[case("name desc")]
	#[case("a\"b")]
	#[case("name--")]
	fn test_invalid_identifiers(#[case] column: &str) {
		assert!(SqlDialect::Generic.quote_identifier(column).is_err());
	}
}
