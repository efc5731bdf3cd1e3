//! Row predicates compiled from search directives.
//!
//! Directives on different columns are ANDed. Inert directives (empty
//! parameter) are dropped at compile time, so an all-inert filter is empty.

use crate::error::{TableError, TableResult};
use crate::pagination::PaginationInfo;
use crate::row::Row;
use crate::search::{SearchDirective, SearchType};
use crate::value::{ComparisonMode, NULL, Operand};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug)]
enum Matcher {
	Like(String),
	Regex(Regex),
	Compare {
		accept: fn(Ordering) -> bool,
		operand: Operand<'static>,
		mode: ComparisonMode,
	},
	In {
		operands: Vec<Operand<'static>>,
		mode: ComparisonMode,
	},
}

impl Matcher {
	fn compile(column: &str, directive: &SearchDirective, mode: ComparisonMode) -> TableResult<Self> {
		let param = directive.param();
		let compare = |accept: fn(Ordering) -> bool| Self::Compare {
			accept,
			operand: Operand::from_text(param).into_owned(),
			mode,
		};

		let matcher = match directive.search_type() {
			SearchType::Like => Self::Like(param.to_lowercase()),
			SearchType::RegexLike => {
				let regex = RegexBuilder::new(param)
					.case_insensitive(true)
					.build()
					.map_err(|e| TableError::validation(column, format!("invalid pattern: {e}")))?;
				Self::Regex(regex)
			}
			SearchType::LessThan => compare(Ordering::is_lt),
			SearchType::LessEqual => compare(Ordering::is_le),
			SearchType::GreaterThan => compare(Ordering::is_gt),
			SearchType::GreaterEqual => compare(Ordering::is_ge),
			SearchType::Equal => compare(Ordering::is_eq),
			SearchType::In => Self::In {
				operands: directive
					.in_values()
					.into_iter()
					.map(|piece| Operand::from_text(piece).into_owned())
					.collect(),
				mode,
			},
		};
		Ok(matcher)
	}

	fn matches(&self, cell: &Value) -> bool {
		let cell = Operand::from_value(cell);
		match self {
			Self::Like(needle) => cell.text().to_lowercase().contains(needle.as_str()),
			Self::Regex(regex) => regex.is_match(cell.text()),
			Self::Compare {
				accept,
				operand,
				mode,
			} => accept(mode.compare_operands(&cell, operand)),
			Self::In { operands, mode } => operands
				.iter()
				.any(|operand| mode.compare_operands(&cell, operand).is_eq()),
		}
	}
}

#[derive(Debug)]
struct ColumnPredicate {
	column: String,
	matcher: Matcher,
}

/// Conjunction of the active search directives of one table.
#[derive(Debug, Default)]
pub struct RowFilter {
	predicates: Vec<ColumnPredicate>,
}

impl RowFilter {
	/// Compiles the search directives held by `info`.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] for a `REGEX_LIKE` pattern that
	/// does not compile.
	pub fn compile(info: &PaginationInfo) -> TableResult<Self> {
		let mut predicates = Vec::new();
		for (column, directive) in info.search_states() {
			if directive.is_inert() {
				continue;
			}
			tracing::trace!(column = %column, search_type = %directive.search_type(), "compiling search directive");
			let matcher = Matcher::compile(column, directive, info.comparison(column))?;
			predicates.push(ColumnPredicate {
				column: column.clone(),
				matcher,
			});
		}
		Ok(Self { predicates })
	}

	/// True when no directive is active and every row passes.
	pub fn is_empty(&self) -> bool {
		self.predicates.is_empty()
	}

	/// Whether `row` satisfies every active directive.
	///
	/// A missing cell is treated as `null`.
	pub fn matches(&self, row: &Row) -> bool {
		self.predicates.iter().all(|predicate| {
			let cell = row.get(&predicate.column).unwrap_or(&NULL);
			predicate.matcher.matches(cell)
		})
	}
}
