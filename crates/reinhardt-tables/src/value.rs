//! Cell value comparison.
//!
//! Every column compares its cells through one declared [`ComparisonMode`],
//! resolved once when the table state is resolved. The ordering search
//! directives, `EQUAL` and `IN` compare one cell against one parameter with
//! [`ComparisonMode::compare`]. Sorting needs a total order over the whole
//! column and uses [`ComparisonMode::sort_order`] instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// How values of one column are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
	/// Numeric when both sides parse as numbers, lexical otherwise.
	///
	/// When sorting, this mode orders like [`ComparisonMode::Numeric`].
	#[default]
	Natural,
	/// Numbers by value. Values that are not numbers order before all
	/// numbers and compare lexically among themselves.
	Numeric,
	/// Text order of the canonical string form.
	Lexical,
}

/// Stand-in for cells missing from a row.
pub(crate) static NULL: Value = Value::Null;

/// A value prepared for comparison: its text form and, if it has one, its
/// numeric value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Operand<'a> {
	text: Cow<'a, str>,
	number: Option<f64>,
}

impl<'a> Operand<'a> {
	pub(crate) fn from_value(value: &'a Value) -> Self {
		let text = value_text(value);
		let number = match value {
			Value::Number(n) => n.as_f64(),
			Value::String(s) => parse_number(s),
			_ => None,
		};
		Self { text, number }
	}

	pub(crate) fn from_text(text: &'a str) -> Self {
		Self {
			text: Cow::Borrowed(text),
			number: parse_number(text),
		}
	}

	pub(crate) fn text(&self) -> &str {
		&self.text
	}

	pub(crate) fn into_owned(self) -> Operand<'static> {
		Operand {
			text: Cow::Owned(self.text.into_owned()),
			number: self.number,
		}
	}
}

impl ComparisonMode {
	/// Compares two cell values.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::ComparisonMode;
	/// use serde_json::json;
	/// use std::cmp::Ordering;
	///
	/// assert_eq!(ComparisonMode::Natural.compare(&json!("9"), &json!(10)), Ordering::Less);
	/// assert_eq!(ComparisonMode::Lexical.compare(&json!("9"), &json!(10)), Ordering::Greater);
	/// assert_eq!(ComparisonMode::Natural.compare(&json!("b"), &json!("a")), Ordering::Greater);
	/// ```
	pub fn compare(self, a: &Value, b: &Value) -> Ordering {
		self.compare_operands(&Operand::from_value(a), &Operand::from_value(b))
	}

	/// Loose equality under this mode.
	pub fn equals(self, a: &Value, b: &Value) -> bool {
		self.compare(a, b) == Ordering::Equal
	}

	/// Total order used to sort a column.
	///
	/// `Natural` on its own is not transitive over mixed cells (`2 < "10"`
	/// by number, `"10" < "1a"` and `"1a" < 2` by text), so sorting orders
	/// `Natural` columns the way `Numeric` does: non-numbers by text first,
	/// then numbers by value.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::ComparisonMode;
	/// use serde_json::json;
	/// use std::cmp::Ordering;
	///
	/// let mode = ComparisonMode::Natural;
	/// assert_eq!(mode.sort_order(&json!(2), &json!("10")), Ordering::Less);
	/// assert_eq!(mode.sort_order(&json!("1a"), &json!(2)), Ordering::Less);
	/// assert_eq!(mode.sort_order(&json!("1a"), &json!("10")), Ordering::Less);
	/// ```
	pub fn sort_order(self, a: &Value, b: &Value) -> Ordering {
		self.sort_operands(&Operand::from_value(a), &Operand::from_value(b))
	}

	pub(crate) fn sort_operands(self, a: &Operand<'_>, b: &Operand<'_>) -> Ordering {
		match self {
			Self::Natural | Self::Numeric => Self::Numeric.compare_operands(a, b),
			Self::Lexical => Self::Lexical.compare_operands(a, b),
		}
	}

	pub(crate) fn compare_operands(self, a: &Operand<'_>, b: &Operand<'_>) -> Ordering {
		match self {
			Self::Lexical => a.text.cmp(&b.text),
			Self::Natural => match (a.number, b.number) {
				(Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
				_ => a.text.cmp(&b.text),
			},
			Self::Numeric => match (a.number, b.number) {
				(Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
				(None, Some(_)) => Ordering::Less,
				(Some(_), None) => Ordering::Greater,
				(None, None) => a.text.cmp(&b.text),
			},
		}
	}
}

/// Canonical text of a cell value.
///
/// Strings are taken as they are, `null` is the empty string, anything
/// else uses its JSON rendering.
pub fn value_text(value: &Value) -> Cow<'_, str> {
	match value {
		Value::String(s) => Cow::Borrowed(s.as_str()),
		Value::Null => Cow::Borrowed(""),
		Value::Bool(true) => Cow::Borrowed("true"),
		Value::Bool(false) => Cow::Borrowed("false"),
		other => Cow::Owned(other.to_string()),
	}
}

/// Parses decimal numeric text such as `"42"`, `"-1.5"` or `"2e3"`.
///
/// Words that `f64` would otherwise accept (`"inf"`, `"NaN"`) are not numbers.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
	let text = text.trim();
	if text.is_empty()
		|| !text
			.bytes()
			.all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
	{
		return None;
	}
	text.parse::<f64>().ok().filter(|n| n.is_finite())
}
