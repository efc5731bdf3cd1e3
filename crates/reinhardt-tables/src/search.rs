//! Search directives: typed per-column filter rules.

use crate::error::{TableError, TableResult};
use crate::value::value_text;
use reinhardt_forms::keys::{SEARCH_PARAMS_KEY, SEARCH_TYPE_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The kind of match a search directive performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
	/// Case-insensitive substring match.
	Like,
	/// Case-insensitive regular expression match.
	RegexLike,
	LessThan,
	LessEqual,
	GreaterThan,
	GreaterEqual,
	Equal,
	/// Membership in a comma separated list.
	In,
}

impl SearchType {
	/// All directive types, in wire-name order.
	pub const ALL: [SearchType; 8] = [
		Self::Like,
		Self::RegexLike,
		Self::LessThan,
		Self::LessEqual,
		Self::GreaterThan,
		Self::GreaterEqual,
		Self::Equal,
		Self::In,
	];

	/// Name used in submitted state.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Like => "LIKE",
			Self::RegexLike => "REGEX_LIKE",
			Self::LessThan => "LESS_THAN",
			Self::LessEqual => "LESS_EQUAL",
			Self::GreaterThan => "GREATER_THAN",
			Self::GreaterEqual => "GREATER_EQUAL",
			Self::Equal => "EQUAL",
			Self::In => "IN",
		}
	}

	/// Number of parameters a directive of this type takes.
	///
	/// `IN` also takes one: the comma joined list of accepted values.
	pub fn arity(self) -> usize {
		1
	}
}

impl fmt::Display for SearchType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SearchType {
	type Err = TableError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| {
				TableError::validation(SEARCH_TYPE_KEY, format!("unknown search type {s:?}"))
			})
	}
}

/// One filter rule for one column.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{SearchDirective, SearchType};
///
/// let directive = SearchDirective::new(SearchType::In, vec!["1,2,3".to_string()]).unwrap();
/// assert_eq!(directive.in_values(), vec!["1", "2", "3"]);
///
/// let inert = SearchDirective::like("");
/// assert!(inert.is_inert());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDirective {
	#[serde(rename = "type")]
	search_type: SearchType,
	params: Vec<String>,
}

impl SearchDirective {
	/// Creates a directive, checking the parameter count for its type.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] on an arity mismatch.
	pub fn new(search_type: SearchType, params: Vec<String>) -> TableResult<Self> {
		let directive = Self {
			search_type,
			params,
		};
		directive.check_arity()?;
		Ok(directive)
	}

	fn single(search_type: SearchType, param: impl Into<String>) -> Self {
		Self {
			search_type,
			params: vec![param.into()],
		}
	}

	pub fn like(param: impl Into<String>) -> Self {
		Self::single(SearchType::Like, param)
	}

	pub fn regex_like(pattern: impl Into<String>) -> Self {
		Self::single(SearchType::RegexLike, pattern)
	}

	pub fn equal(param: impl Into<String>) -> Self {
		Self::single(SearchType::Equal, param)
	}

	pub fn less_than(param: impl Into<String>) -> Self {
		Self::single(SearchType::LessThan, param)
	}

	pub fn less_equal(param: impl Into<String>) -> Self {
		Self::single(SearchType::LessEqual, param)
	}

	pub fn greater_than(param: impl Into<String>) -> Self {
		Self::single(SearchType::GreaterThan, param)
	}

	pub fn greater_equal(param: impl Into<String>) -> Self {
		Self::single(SearchType::GreaterEqual, param)
	}

	/// `IN` directive over the given values, joined with commas.
	pub fn one_of<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let joined = values
			.into_iter()
			.map(|v| v.as_ref().to_string())
			.collect::<Vec<_>>()
			.join(",");
		Self::single(SearchType::In, joined)
	}

	/// Reads a directive from submitted `{type, params}` state.
	///
	/// Numbers and booleans inside `params` are accepted as their text.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] naming `column` when the state is
	/// not a mapping, the type is missing or unknown, `params` is not an
	/// array, or the parameter count is wrong.
	pub fn from_state(column: &str, state: &Value) -> TableResult<Self> {
		let field = |key: &str| format!("{column}.{key}");

		let Value::Object(map) = state else {
			return Err(TableError::validation(
				column,
				"search state must be a mapping with type and params",
			));
		};

		let search_type = match map.get(SEARCH_TYPE_KEY) {
			Some(Value::String(name)) => name.parse::<SearchType>().map_err(|_| {
				TableError::validation(
					field(SEARCH_TYPE_KEY),
					format!("unknown search type {name:?}"),
				)
			})?,
			Some(other) => {
				return Err(TableError::validation(
					field(SEARCH_TYPE_KEY),
					format!("expected a string, got {other}"),
				));
			}
			None => {
				return Err(TableError::validation(
					field(SEARCH_TYPE_KEY),
					"missing search type",
				));
			}
		};

		let params = match map.get(SEARCH_PARAMS_KEY) {
			Some(Value::Array(items)) => items
				.iter()
				.map(|item| match item {
					Value::Array(_) | Value::Object(_) => Err(TableError::validation(
						field(SEARCH_PARAMS_KEY),
						"parameters must be scalars",
					)),
					scalar => Ok(value_text(scalar).into_owned()),
				})
				.collect::<TableResult<Vec<_>>>()?,
			Some(other) => {
				return Err(TableError::validation(
					field(SEARCH_PARAMS_KEY),
					format!("expected an array, got {other}"),
				));
			}
			None => Vec::new(),
		};

		let directive = Self {
			search_type,
			params,
		};
		directive
			.check_arity()
			.map_err(|_| {
				TableError::validation(
					field(SEARCH_PARAMS_KEY),
					format!(
						"{} takes {} parameter(s), got {}",
						search_type,
						search_type.arity(),
						directive.params.len()
					),
				)
			})?;
		Ok(directive)
	}

	pub(crate) fn check_arity(&self) -> TableResult<()> {
		let expected = self.search_type.arity();
		if self.params.len() == expected {
			Ok(())
		} else {
			Err(TableError::validation(
				SEARCH_PARAMS_KEY,
				format!(
					"{} takes {} parameter(s), got {}",
					self.search_type,
					expected,
					self.params.len()
				),
			))
		}
	}

	pub fn search_type(&self) -> SearchType {
		self.search_type
	}

	pub fn params(&self) -> &[String] {
		&self.params
	}

	/// The single parameter every current directive type takes.
	pub fn param(&self) -> &str {
		self.params.first().map(String::as_str).unwrap_or("")
	}

	/// An empty parameter means the column is not filtered.
	pub fn is_inert(&self) -> bool {
		self.param().is_empty()
	}

	/// The pieces of an `IN` parameter, trimmed.
	pub fn in_values(&self) -> Vec<&str> {
		self.param().split(',').map(str::trim).collect()
	}
}
