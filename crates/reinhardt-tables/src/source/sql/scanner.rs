//! Locates the top-level clauses of a SELECT statement.
//!
//! Only what is needed to splice directives into a base query is
//! recognised. Quoted text, comments and anything inside parentheses are
//! skipped, so keywords in sub-queries or string literals never match.

use crate::error::{TableError, TableResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
	Where,
	GroupBy,
	Having,
	OrderBy,
	Limit,
	Offset,
	Fetch,
	SetOperator,
}

/// A top-level clause keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clause {
	pub(crate) keyword: Keyword,
	/// Byte offset of the keyword.
	pub(crate) start: usize,
	/// Byte offset just past the keyword (and its `BY`).
	pub(crate) body: usize,
}

fn malformed(message: &str) -> TableError {
	TableError::validation("query", message)
}

fn is_word_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn word_end(bytes: &[u8], start: usize) -> usize {
	let mut end = start;
	while end < bytes.len() && is_word_byte(bytes[end]) {
		end += 1;
	}
	end
}

/// Returns the index just past the closing quote. A doubled quote is an
/// escaped quote character.
fn skip_quoted(bytes: &[u8], open: usize) -> Option<usize> {
	let quote = bytes[open];
	let mut i = open + 1;
	while i < bytes.len() {
		if bytes[i] == quote {
			if bytes.get(i + 1) == Some(&quote) {
				i += 2;
				continue;
			}
			return Some(i + 1);
		}
		i += 1;
	}
	None
}

/// The `BY` following `GROUP`/`ORDER`, as the offset just past it.
fn following_by(sql: &str, from: usize) -> Option<usize> {
	let bytes = sql.as_bytes();
	let mut start = from;
	while start < bytes.len() && bytes[start].is_ascii_whitespace() {
		start += 1;
	}
	let end = word_end(bytes, start);
	sql[start..end].eq_ignore_ascii_case("BY").then_some(end)
}

/// Lists the top-level clause keywords of `sql` in order of appearance.
///
/// # Errors
///
/// Returns [`TableError::Validation`] on the `query` field for an
/// unterminated quote or comment, or unbalanced parentheses.
pub(crate) fn scan(sql: &str) -> TableResult<Vec<Clause>> {
	let bytes = sql.as_bytes();
	let mut clauses = Vec::new();
	let mut depth = 0usize;
	let mut i = 0;

	while i < bytes.len() {
		match bytes[i] {
			b'\'' | b'"' | b'`' => {
				i = skip_quoted(bytes, i).ok_or_else(|| malformed("unterminated quoted text"))?;
				continue;
			}
			b'-' if bytes.get(i + 1) == Some(&b'-') => {
				i = sql[i..].find('\n').map_or(bytes.len(), |n| i + n + 1);
				continue;
			}
			b'/' if bytes.get(i + 1) == Some(&b'*') => {
				let close = sql[i + 2..]
					.find("*/")
					.ok_or_else(|| malformed("unterminated comment"))?;
				i += close + 4;
				continue;
			}
			b'(' => depth += 1,
			b')' => {
				depth = depth
					.checked_sub(1)
					.ok_or_else(|| malformed("unbalanced parentheses"))?;
			}
			b if is_word_byte(b) => {
				let start = i;
				i = word_end(bytes, start);
				if depth == 0 && b.is_ascii_alphabetic() {
					if let Some(clause) = keyword_at(sql, start, i) {
						i = clause.body;
						clauses.push(clause);
					}
				}
				continue;
			}
			_ => {}
		}
		i += 1;
	}

	if depth != 0 {
		return Err(malformed("unbalanced parentheses"));
	}
	Ok(clauses)
}

fn keyword_at(sql: &str, start: usize, end: usize) -> Option<Clause> {
	let word = sql[start..end].to_ascii_uppercase();
	let simple = |keyword| {
		Some(Clause {
			keyword,
			start,
			body: end,
		})
	};
	match word.as_str() {
		"WHERE" => simple(Keyword::Where),
		"HAVING" => simple(Keyword::Having),
		"LIMIT" => simple(Keyword::Limit),
		"OFFSET" => simple(Keyword::Offset),
		"FETCH" => simple(Keyword::Fetch),
		"UNION" | "INTERSECT" | "EXCEPT" => simple(Keyword::SetOperator),
		"GROUP" | "ORDER" => {
			let body = following_by(sql, end)?;
			let keyword = if word == "GROUP" {
				Keyword::GroupBy
			} else {
				Keyword::OrderBy
			};
			Some(Clause {
				keyword,
				start,
				body,
			})
		}
		_ => None,
	}
}
