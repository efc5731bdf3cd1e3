//! Request-scoped view over one form's submitted state.

use crate::error::{StateError, StateResult};
use crate::keys::{
	CURRENT_PAGE_KEY, FORWARDED_STATE_KEY, LIMIT_KEY, ONLY_FRAGMENT_KEY, PAGINATION_KEY,
	SEARCHING_KEY, SORTING_KEY, table_path,
};
use crate::payload::parse_nested_query;
use serde_json::{Map, Value};

/// Immutable view over the part of a request payload that belongs to one form.
///
/// Every lookup goes through an explicit key path. A missing key, or a node
/// along the way that is not a mapping, yields `None`; that is distinct from
/// an explicit empty string or `false` stored in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
	form_name: String,
	form_data: Value,
	submitted: bool,
}

impl FormState {
	/// Builds the state for `form_name` out of a nested request payload.
	///
	/// When the payload has no entry for the form, the state falls back to
	/// `[_forwarded_state, form_name]` inside `previous`, which is how a later
	/// wizard step sees what an earlier step submitted.
	///
	/// # Errors
	///
	/// Returns [`StateError::Configuration`] if `form_name` is empty.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_forms::FormState;
	/// use serde_json::json;
	///
	/// let payload = json!({"people": {"_state": {"_sorting_state": {"name": "asc"}}}});
	/// let state = FormState::new("people", &payload, None).unwrap();
	/// assert!(state.is_submitted());
	/// assert_eq!(state.sorting_state(""), Some(&json!({"name": "asc"})));
	/// assert_eq!(state.find(&["missing", "path"]), None);
	/// ```
	pub fn new(
		form_name: impl Into<String>,
		payload: &Value,
		previous: Option<&FormState>,
	) -> StateResult<Self> {
		let form_name = form_name.into();
		if form_name.is_empty() {
			return Err(StateError::Configuration(
				"form name must not be empty".to_string(),
			));
		}

		if let Some(data) = payload.get(&form_name) {
			return Ok(Self {
				form_name,
				form_data: data.clone(),
				submitted: true,
			});
		}

		let forwarded = previous.and_then(|prev| prev.forwarded_state(&form_name));
		let form_data = match forwarded {
			Some(data) => {
				tracing::debug!(form = %form_name, "restoring form state from forwarded state");
				data.clone()
			}
			None => Value::Object(Map::new()),
		};

		Ok(Self {
			form_name,
			form_data,
			submitted: false,
		})
	}

	/// Builds the state from a raw urlencoded query string or request body.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_forms::FormState;
	///
	/// let state = FormState::from_query_string(
	/// 	"people",
	/// 	"people[_state][_pagination][_limit]=10",
	/// 	None,
	/// )
	/// .unwrap();
	/// assert_eq!(state.pagination_limit("").unwrap(), Some(10));
	/// ```
	pub fn from_query_string(
		form_name: impl Into<String>,
		query: &str,
		previous: Option<&FormState>,
	) -> StateResult<Self> {
		let payload = parse_nested_query(query)?;
		Self::new(form_name, &payload, previous)
	}

	/// Builds a state for a form that was not part of the request.
	pub fn empty(form_name: impl Into<String>) -> StateResult<Self> {
		Self::new(form_name, &Value::Null, None)
	}

	pub fn form_name(&self) -> &str {
		&self.form_name
	}

	/// The raw subtree of the payload owned by this form.
	pub fn form_data(&self) -> &Value {
		&self.form_data
	}

	/// Whether the current request carried data for this form.
	///
	/// State recovered from a previous step's forwarded state does not count.
	pub fn is_submitted(&self) -> bool {
		self.submitted
	}

	/// Walks `path` through the form data.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_forms::FormState;
	/// use serde_json::json;
	///
	/// let payload = json!({"f": {"a": {"b": ""}, "flag": false}});
	/// let state = FormState::new("f", &payload, None).unwrap();
	/// assert_eq!(state.find(&["a", "b"]), Some(&json!("")));
	/// assert_eq!(state.find(&["flag"]), Some(&json!(false)));
	/// assert_eq!(state.find(&["flag", "deeper"]), None);
	/// assert_eq!(state.find(&["a", "c"]), None);
	/// ```
	pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
		path.iter().try_fold(&self.form_data, |node, key| match node {
			Value::Object(map) => map.get(key.as_ref()),
			_ => None,
		})
	}

	/// Sort directions submitted for `table_name` (empty for the default table).
	pub fn sorting_state(&self, table_name: &str) -> Option<&Value> {
		self.find(&table_path(table_name, SORTING_KEY))
	}

	/// Search directives submitted for `table_name`.
	pub fn searching_state(&self, table_name: &str) -> Option<&Value> {
		self.find(&table_path(table_name, SEARCHING_KEY))
	}

	/// Pagination sub-state submitted for `table_name`.
	pub fn pagination_state(&self, table_name: &str) -> Option<&Value> {
		self.find(&table_path(table_name, PAGINATION_KEY))
	}

	/// Explicit page size chosen by the client, `Some(0)` meaning all rows.
	///
	/// # Errors
	///
	/// Returns [`StateError::Validation`] when the value is not a
	/// non-negative integer.
	pub fn pagination_limit(&self, table_name: &str) -> StateResult<Option<usize>> {
		self.pagination_number(table_name, LIMIT_KEY)
	}

	/// Explicit zero-based page number chosen by the client.
	///
	/// # Errors
	///
	/// Returns [`StateError::Validation`] when the value is not a
	/// non-negative integer.
	pub fn current_page(&self, table_name: &str) -> StateResult<Option<usize>> {
		self.pagination_number(table_name, CURRENT_PAGE_KEY)
	}

	/// Whether the client asked for the form fragment only (AJAX refresh).
	pub fn is_fragment_request(&self) -> bool {
		match self.find(&[ONLY_FRAGMENT_KEY]) {
			Some(Value::Bool(flag)) => *flag,
			Some(Value::Number(n)) => n.as_u64() == Some(1),
			Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
			_ => false,
		}
	}

	/// State forwarded by this form to the form named `form_name`.
	pub fn forwarded_state(&self, form_name: &str) -> Option<&Value> {
		self.find(&[FORWARDED_STATE_KEY, form_name])
	}

	fn pagination_number(&self, table_name: &str, key: &str) -> StateResult<Option<usize>> {
		let mut path = table_path(table_name, PAGINATION_KEY);
		path.push(key);
		match self.find(&path) {
			None | Some(Value::Null) => Ok(None),
			Some(value) => parse_count(value).map_err(|message| StateError::validation(&path, message)),
		}
	}
}

/// Reads a non-negative integer that may arrive as a JSON number or a string.
fn parse_count(value: &Value) -> Result<Option<usize>, String> {
	match value {
		Value::Number(n) => n
			.as_u64()
			.and_then(|n| usize::try_from(n).ok())
			.map(Some)
			.ok_or_else(|| format!("expected a non-negative integer, got {n}")),
		Value::String(s) if s.trim().is_empty() => Ok(None),
		Value::String(s) => s
			.trim()
			.parse::<usize>()
			.map(Some)
			.map_err(|_| format!("expected a non-negative integer, got {s:?}")),
		other => Err(format!("expected a non-negative integer, got {other}")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn two_table_payload() -> Value {
		json!({
			"report": {
				"_state": {
					"_sorting_state": {"name": "asc"},
					"_pagination": {"_limit": "10", "_current_page": 2},
					"orders": {
						"_sorting_state": {"total": "desc"},
						"_pagination": {"_limit": 0}
					}
				},
				"_only_fragment": "1"
			}
		})
	}

	#[rstest]
	fn test_empty_form_name_is_configuration_error() {
		let result = FormState::new("", &json!({}), None);
		assert!(matches!(result, Err(StateError::Configuration(_))));
	}

	#[rstest]
	fn test_tables_are_namespaced(two_table_payload: Value) {
		let state = FormState::new("report", &two_table_payload, None).unwrap();

		assert_eq!(state.sorting_state(""), Some(&json!({"name": "asc"})));
		assert_eq!(state.sorting_state("orders"), Some(&json!({"total": "desc"})));
		assert_eq!(state.pagination_limit("").unwrap(), Some(10));
		assert_eq!(state.current_page("").unwrap(), Some(2));
		assert_eq!(state.pagination_limit("orders").unwrap(), Some(0));
		assert_eq!(state.current_page("orders").unwrap(), None);
		assert_eq!(state.searching_state("orders"), None);
	}

	#[rstest]
	fn test_fragment_flag(two_table_payload: Value) {
		let state = FormState::new("report", &two_table_payload, None).unwrap();
		assert!(state.is_fragment_request());

		let plain = FormState::new("report", &json!({"report": {}}), None).unwrap();
		assert!(!plain.is_fragment_request());
	}

	#[rstest]
	#[case(json!(-1))]
	#[case(json!(1.5))]
	#[case(json!("ten"))]
	#[case(json!(["10"]))]
	#[case(json!(true))]
	fn test_invalid_limit_is_validation_error(#[case] limit: Value) {
		let payload = json!({"f": {"_state": {"_pagination": {"_limit": limit}}}});
		let state = FormState::new("f", &payload, None).unwrap();

		let err = state.pagination_limit("").unwrap_err();
		assert!(matches!(
			err,
			StateError::Validation { ref field, .. } if field == "_state._pagination._limit"
		));
	}

	#[rstest]
	fn test_blank_limit_is_absent() {
		let payload = json!({"f": {"_state": {"_pagination": {"_limit": " "}}}});
		let state = FormState::new("f", &payload, None).unwrap();
		assert_eq!(state.pagination_limit("").unwrap(), None);
	}

	#[rstest]
	fn test_forwarded_state_is_used_when_form_missing() {
		// Arrange
		let step_one = json!({
			"step1": {
				"choice": "b",
				"_forwarded_state": {"step2": {"picked": ["3", "7"]}}
			}
		});
		let previous = FormState::new("step1", &step_one, None).unwrap();

		// Act
		let state = FormState::new("step2", &json!({}), Some(&previous)).unwrap();

		// Assert
		assert!(!state.is_submitted());
		assert_eq!(state.find(&["picked"]), Some(&json!(["3", "7"])));
	}

	#[rstest]
	fn test_current_request_wins_over_forwarded_state() {
		let previous = FormState::new(
			"step1",
			&json!({"step1": {"_forwarded_state": {"step2": {"picked": "old"}}}}),
			None,
		)
		.unwrap();

		let state =
			FormState::new("step2", &json!({"step2": {"picked": "new"}}), Some(&previous)).unwrap();

		assert!(state.is_submitted());
		assert_eq!(state.find(&["picked"]), Some(&json!("new")));
	}

	#[rstest]
	fn test_missing_form_without_previous_is_empty() {
		let state = FormState::empty("f").unwrap();
		assert!(!state.is_submitted());
		assert_eq!(state.form_data(), &json!({}));
		assert_eq!(state.sorting_state(""), None);
	}
}
