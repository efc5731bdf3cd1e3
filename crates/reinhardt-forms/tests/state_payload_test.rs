//! Form state built from raw query strings, the way the rendering shell
//! receives them.

use reinhardt_forms::{FormState, StateError};
use rstest::*;
use serde_json::json;

#[rstest]
fn test_two_forms_in_one_request_do_not_collide() {
	let query = "users[_state][_sorting_state][name]=desc\
		&groups[_state][_sorting_state][title]=asc\
		&users[_state][_pagination][_current_page]=3";

	let users = FormState::from_query_string("users", query, None).unwrap();
	let groups = FormState::from_query_string("groups", query, None).unwrap();

	assert_eq!(users.sorting_state(""), Some(&json!({"name": "desc"})));
	assert_eq!(groups.sorting_state(""), Some(&json!({"title": "asc"})));
	assert_eq!(users.current_page("").unwrap(), Some(3));
	assert_eq!(groups.current_page("").unwrap(), None);
}

#[rstest]
fn test_search_directive_shape_survives_decoding() {
	let query = "f[_state][people][_searching_state][name][type]=LIKE\
		&f[_state][people][_searching_state][name][params][]=ali";

	let state = FormState::from_query_string("f", query, None).unwrap();

	assert_eq!(
		state.searching_state("people"),
		Some(&json!({"name": {"type": "LIKE", "params": ["ali"]}}))
	);
	assert_eq!(state.searching_state(""), None);
}

#[rstest]
fn test_wizard_chain_replays_forwarded_selection() {
	// Arrange
	let step_one = FormState::from_query_string(
		"pick",
		"pick[_forwarded_state][confirm][ids][]=4&pick[_forwarded_state][confirm][ids][]=9",
		None,
	)
	.unwrap();

	// Act
	let step_two = FormState::from_query_string("confirm", "other[x]=1", Some(&step_one)).unwrap();

	// Assert
	assert!(!step_two.is_submitted());
	assert_eq!(step_two.find(&["ids"]), Some(&json!(["4", "9"])));
}

#[rstest]
fn test_empty_form_name_is_rejected() {
	let result = FormState::from_query_string("", "a=1", None);
	assert!(matches!(result, Err(StateError::Configuration(_))));
}
