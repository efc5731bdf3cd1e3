//! Reserved keys of the form state payload.
//!
//! A table's state lives under `[form, STATE_KEY, table?, ...]`. The table
//! segment is left out for the default (unnamed) table, which is what keeps
//! two tables in one form from sharing sort, search or page state.

/// Root of all table state inside a form.
pub const STATE_KEY: &str = "_state";

/// Per-column sort directions (`column => "asc" | "desc"`).
pub const SORTING_KEY: &str = "_sorting_state";

/// Per-column search directives (`column => { type, params }`).
pub const SEARCHING_KEY: &str = "_searching_state";

/// Pagination sub-state holding [`LIMIT_KEY`] and [`CURRENT_PAGE_KEY`].
pub const PAGINATION_KEY: &str = "_pagination";

/// Rows per page, `0` meaning all rows.
pub const LIMIT_KEY: &str = "_limit";

/// Zero-based page number.
pub const CURRENT_PAGE_KEY: &str = "_current_page";

/// Set when the client only wants the form fragment back (AJAX refresh).
pub const ONLY_FRAGMENT_KEY: &str = "_only_fragment";

/// Holds state carried over from earlier wizard steps, keyed by form name.
pub const FORWARDED_STATE_KEY: &str = "_forwarded_state";

/// Search directive type field.
pub const SEARCH_TYPE_KEY: &str = "type";

/// Search directive parameter list.
pub const SEARCH_PARAMS_KEY: &str = "params";

/// Builds the path to a table's sub-state.
///
/// # Examples
///
/// ```
/// use reinhardt_forms::keys::{table_path, SORTING_KEY};
///
/// assert_eq!(table_path("", SORTING_KEY), vec!["_state", "_sorting_state"]);
/// assert_eq!(
/// 	table_path("orders", SORTING_KEY),
/// 	vec!["_state", "orders", "_sorting_state"]
/// );
/// ```
pub fn table_path<'a>(table_name: &'a str, sub_key: &'a str) -> Vec<&'a str> {
	let mut path = Vec::with_capacity(3);
	path.push(STATE_KEY);
	if !table_name.is_empty() {
		path.push(table_name);
	}
	path.push(sub_key);
	path
}
