//! # Reinhardt Data Tables
//!
//! Server-side data tables for Reinhardt.
//!
//! A table renders one page of rows out of a larger data set. Which page,
//! in which order and under which filters is decided by the table's
//! declared settings and by the state the client submitted with its form.
//! This crate bundles the two halves of that job:
//!
//! - [`forms`]: decoding of submitted form payloads and lookup of each
//!   table's sorting, searching and pagination state
//! - [`tables`]: settings, state resolution, and the array, iterator and
//!   SQL data sources that produce the page
//!
//! ## Feature Flags
//!
//! - `forms` - Form state decoding only
//! - `tables` - Table engine, implies `forms`
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_datatables::prelude::*;
//! use serde_json::json;
//!
//! let rows: Vec<Row> = (1..=30)
//! 	.map(|i| Row::from_iter([("id", json!(i)), ("name", json!(format!("user{i}")))]))
//! 	.collect();
//!
//! let settings = DataTableSettings::builder()
//! 	.default_limit(10)
//! 	.default_sort("id", SortDirection::Descending)
//! 	.build()
//! 	.unwrap();
//! let table = DataTable::new("", settings).rowkey_column("id");
//!
//! let state = FormState::from_query_string("users", "users[_state][_pagination][_current_page]=1", None)
//! 	.unwrap();
//! let page = table.load(Some(&state), &mut ArraySource::new(rows)).unwrap();
//!
//! assert_eq!(page.total_rows, Some(30));
//! assert_eq!(page.rows[0].key, RowKey::Value("20".to_string()));
//! ```

#[cfg(feature = "forms")]
pub mod forms;
#[cfg(feature = "tables")]
pub mod tables;

/// Convenience re-exports for building and loading tables.
pub mod prelude {
	#[cfg(feature = "forms")]
	pub use crate::forms::{FormState, StateError};

	#[cfg(feature = "tables")]
	pub use crate::tables::{
		ArraySource, Column, ComparisonMode, DataSource, DataTable, DataTableSettings, FnRowSource,
		IteratorSource, KeyedRow, PaginationInfo, Row, RowKey, RowSource, SearchDirective,
		SearchType, SelectQuery, SettingsResolver, SortDirection, SqlDialect, SqlExecutor, SqlQuery,
		SqlSource, TableError, TablePage, TableResult,
	};
}
