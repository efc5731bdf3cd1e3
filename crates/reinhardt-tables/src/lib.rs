//! Data table engine for Reinhardt
//!
//! This crate reconciles three inputs into the exact page of rows a table
//! renders: the table's declared defaults, the state a client submitted
//! with its last request, and the data source behind the table.
//!
//! # Features
//!
//! - **Settings**: Validated defaults for page size, sorting and filtering
//! - **Resolution**: Submitted state merged over settings into a [`PaginationInfo`]
//! - **Searching**: `LIKE`, `REGEX_LIKE`, comparison and `IN` directives
//! - **Sorting**: Multi-column sorting with per-column comparison modes
//! - **Data Sources**: In-memory, external iterator and SQL backends
//! - **Row Keys**: Stable row identity for selection widgets
//!
//! # Architecture
//!
//! See [`DataTable`] for the data flow diagram.
//!
//! Every source applies its steps in the same order: filter, count, sort,
//! then window. The count therefore always describes the filtered rows.
//!
//! # Example
//!
//! ```rust
//! use reinhardt_forms::FormState;
//! use reinhardt_tables::{ArraySource, DataTable, DataTableSettings, Row, SortDirection};
//! use serde_json::json;
//!
//! let rows: Vec<Row> = ["carol", "alice", "bob"]
//! 	.into_iter()
//! 	.map(|name| Row::from_iter([("name", json!(name))]))
//! 	.collect();
//!
//! let settings = DataTableSettings::builder()
//! 	.default_sort("name", SortDirection::Ascending)
//! 	.build()
//! 	.unwrap();
//! let table = DataTable::new("", settings);
//!
//! let payload = json!({"people": {"_state": {"_sorting_state": {"name": "desc"}}}});
//! let state = FormState::new("people", &payload, None).unwrap();
//!
//! let page = table.load(Some(&state), &mut ArraySource::new(rows)).unwrap();
//! let names: Vec<_> = page.rows.iter().map(|r| r.row.get("name").unwrap().clone()).collect();
//! assert_eq!(names, vec![json!("carol"), json!("bob"), json!("alice")]);
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

pub mod column;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod row;
pub mod rowkey;
pub mod search;
pub mod settings;
pub mod sorting;
pub mod source;
pub mod table;
pub mod value;

// Re-exports for convenience
pub use column::{Column, ColumnSet};
pub use error::{ErrorKind, TableError, TableResult};
pub use filter::RowFilter;
pub use pagination::{PaginationInfo, SettingsResolver, resolve};
pub use row::{KeyedRow, Row, RowKey};
pub use rowkey::RowKeyProjection;
pub use search::{SearchDirective, SearchType};
pub use settings::{DEFAULT_LIMIT, DataTableConfig, DataTableSettings, DataTableSettingsBuilder};
pub use sorting::{MultiSortStrategy, SortDirection, SortOrder};
pub use source::sql::SqlPlan;
pub use source::{
	ArraySource, DataSource, FnRowSource, IntoRow, IteratorSource, RowIter, RowSequence, RowSource,
	SelectQuery, SourcePage, SqlDialect, SqlExecutor, SqlQuery, SqlSource,
};
pub use table::{DataTable, PageControls, TablePage};
pub use value::{ComparisonMode, value_text};
