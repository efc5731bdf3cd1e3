//! Common test fixtures for reinhardt-tables tests

use reinhardt_forms::FormState;
use reinhardt_tables::{DataTableSettings, Row, SqlExecutor, TableResult};
use rstest::*;
use serde_json::{Value, json};

/// Form name used by every fixture state
pub const FORM: &str = "report";

/// Fixture providing rows numbered 0..15 under the `value` column
#[fixture]
pub fn numbered_rows() -> Vec<Row> {
	(0..15)
		.map(|i| Row::from_iter([("id", json!(format!("row-{i}"))), ("value", json!(i))]))
		.collect()
}

/// Fixture providing a small user list with mixed cell types
#[fixture]
pub fn sample_users() -> Vec<Row> {
	[
		(1, "Alice", "alice@example.com", true, 34),
		(2, "Bob", "bob@example.com", false, 27),
		(3, "Charlie", "charlie@example.com", true, 41),
		(4, "alicia", "alicia@example.org", true, 9),
		(5, "Dave", "dave@example.org", false, 100),
	]
	.into_iter()
	.map(|(id, name, email, active, age)| {
		Row::from_iter([
			("id", json!(id)),
			("name", json!(name)),
			("email", json!(email)),
			("active", json!(active)),
			("age", json!(age)),
		])
	})
	.collect()
}

/// Fixture providing settings with ten rows per page
#[fixture]
pub fn ten_per_page() -> DataTableSettings {
	DataTableSettings::builder()
		.default_limit(10)
		.build()
		.unwrap()
}

/// Builds the state of [`FORM`] from the data submitted under it
pub fn submitted(form_data: Value) -> FormState {
	FormState::new(FORM, &json!({ FORM: form_data }), None).unwrap()
}

/// Executor that records every query and answers with canned results
#[derive(Debug, Default)]
pub struct RecordingExecutor {
	pub count: usize,
	pub rows: Vec<Row>,
	pub executed: Vec<String>,
}

impl SqlExecutor for RecordingExecutor {
	fn fetch_count(&mut self, sql: &str) -> TableResult<usize> {
		self.executed.push(sql.to_string());
		Ok(self.count)
	}

	fn fetch_rows(&mut self, sql: &str) -> TableResult<Vec<Row>> {
		self.executed.push(sql.to_string());
		Ok(self.rows.clone())
	}
}
