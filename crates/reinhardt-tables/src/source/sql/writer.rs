//! Helper for assembling SQL text with consistent spacing.

/// Accumulates SQL text.
///
/// Keywords are separated from what precedes them by exactly one space;
/// raw fragments are appended as given.
#[derive(Debug, Clone, Default)]
pub(crate) struct SqlWriter {
	sql: String,
}

impl SqlWriter {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Push a string to SQL
	pub(crate) fn push(&mut self, s: &str) {
		self.sql.push_str(s);
	}

	/// Push a space unless the text is empty or already ends in one
	pub(crate) fn push_space(&mut self) {
		if !self.sql.is_empty() && !self.sql.ends_with(' ') {
			self.sql.push(' ');
		}
	}

	/// Push a keyword (with automatic spacing)
	pub(crate) fn push_keyword(&mut self, keyword: &str) {
		self.push_space();
		self.sql.push_str(keyword);
	}

	/// Push a space-separated fragment, skipping empty ones
	pub(crate) fn push_clause(&mut self, fragment: &str) {
		let fragment = fragment.trim();
		if !fragment.is_empty() {
			self.push_space();
			self.sql.push_str(fragment);
		}
	}

	/// Push a list of items with a separator
	pub(crate) fn push_list<I, T, F>(&mut self, items: I, separator: &str, mut f: F)
	where
		I: IntoIterator<Item = T>,
		F: FnMut(&mut Self, T),
	{
		let mut first = true;
		for item in items {
			if !first {
				self.sql.push_str(separator);
			}
			f(self, item);
			first = false;
		}
	}

	pub(crate) fn into_string(self) -> String {
		self.sql
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_keywords_are_spaced_once() {
		let mut writer = SqlWriter::new();
		writer.push_keyword("SELECT");
		writer.push(" *");
		writer.push_keyword("FROM");
		writer.push_clause("  t  ");
		writer.push_clause("");
		assert_eq!(writer.into_string(), "SELECT * FROM t");
	}

	#[rstest]
	fn test_push_list() {
		let mut writer = SqlWriter::new();
		writer.push_list(["a", "b", "c"], ", ", |w, item| w.push(item));
		assert_eq!(writer.into_string(), "a, b, c");
	}
}
