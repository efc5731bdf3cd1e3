//! One table of a form: settings in, a rendered page's worth of data out.

use crate::error::TableResult;
use crate::pagination::{PaginationInfo, SettingsResolver};
use crate::row::KeyedRow;
use crate::settings::DataTableSettings;
use crate::source::DataSource;
use indexmap::IndexMap;
use reinhardt_forms::FormState;
use serde::Serialize;

/// Pagination controls for the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
	/// Zero-based page being shown, clamped to the pages that exist.
	pub current_page: usize,
	/// `None` when the source could not count its rows; render
	/// previous/next links only.
	pub num_pages: Option<usize>,
	pub has_previous: bool,
	pub has_next: bool,
	/// Page size in effect, `0` for all rows.
	pub limit: usize,
	pub limit_options: IndexMap<usize, String>,
}

/// Everything a renderer needs for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
	/// Resolution the rows were fetched with, after clamping.
	pub info: PaginationInfo,
	pub rows: Vec<KeyedRow>,
	/// Rows matching the filters, when known.
	pub total_rows: Option<usize>,
	pub controls: PageControls,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// A named table and its settings.
///
/// # Architecture
///
/// ```mermaid
/// graph TD
///     A[FormState] --> C[SettingsResolver]
///     B[DataTableSettings] --> C
///     C --> D[PaginationInfo]
///     D --> E[DataSource]
///     E --> F[ArraySource]
///     E --> G[IteratorSource]
///     E --> H[SqlSource]
///     E --> I[RowKeyProjection]
///     I --> J[TablePage]
/// ```
///
/// # Examples
///
/// ```
/// use reinhardt_forms::FormState;
/// use reinhardt_tables::{ArraySource, DataTable, DataTableSettings, Row};
/// use serde_json::json;
///
/// let rows: Vec<Row> = (0..15).map(|i| Row::from_iter([("value", json!(i))])).collect();
/// let settings = DataTableSettings::builder()
/// 	.default_limit(10)
/// 	.build()
/// 	.unwrap();
/// let table = DataTable::new("", settings);
///
/// // A client asking for page 7 of 2 gets the last page.
/// let payload = json!({"report": {"_state": {"_pagination": {"_current_page": 7}}}});
/// let state = FormState::new("report", &payload, None).unwrap();
///
/// let page = table.load(Some(&state), &mut ArraySource::new(rows)).unwrap();
/// assert_eq!(page.controls.current_page, 1);
/// assert_eq!(page.controls.num_pages, Some(2));
/// assert_eq!(page.rows.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
	name: String,
	settings: DataTableSettings,
	rowkey_column: Option<String>,
}

impl DataTable {
	/// A table named `name` within its form; the empty name is the default
	/// table.
	pub fn new(name: impl Into<String>, settings: DataTableSettings) -> Self {
		Self {
			name: name.into(),
			settings,
			rowkey_column: None,
		}
	}

	/// Keys rows by the value of `column` instead of their position.
	pub fn rowkey_column(mut self, column: impl Into<String>) -> Self {
		self.rowkey_column = Some(column.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn settings(&self) -> &DataTableSettings {
		&self.settings
	}

	/// Resolves the submitted state against this table's settings.
	///
	/// # Errors
	///
	/// See [`SettingsResolver::resolve`].
	pub fn resolve(&self, state: Option<&FormState>) -> TableResult<PaginationInfo> {
		SettingsResolver::new(Some(&self.settings), &self.name).resolve(state)
	}

	/// Resolves state, fetches the page and computes its controls.
	///
	/// Once the source reports a row count, resolution runs again with the
	/// count in the settings. A page past the end is clamped to the last one
	/// and fetched again, so a stale page number never renders empty.
	///
	/// # Errors
	///
	/// Any resolution or source error, and [`TableError::Data`] when two
	/// rows of the page share a key. No partial page is returned.
	///
	/// [`TableError::Data`]: crate::TableError::Data
	pub fn load<S>(&self, state: Option<&FormState>, source: &mut S) -> TableResult<TablePage>
	where
		S: DataSource + ?Sized,
	{
		let info = self.resolve(state)?;
		let (mut rows, total_rows) = self.fetch(source, &info)?;

		let (info, current_page) = match total_rows {
			Some(total) => {
				let counted = self.settings.with_total_rows(total);
				let info = SettingsResolver::new(Some(&counted), &self.name).resolve(state)?;
				let current_page = info.current_page(total);
				if current_page != info.nominal_page() {
					tracing::debug!(
						table = %self.name,
						requested = info.nominal_page(),
						current_page,
						"requested page is out of range, clamping"
					);
					let clamped = info.with_page(current_page);
					rows = self.fetch(source, &clamped)?.0;
					(clamped, current_page)
				} else {
					(info, current_page)
				}
			}
			None => {
				let current_page = info.nominal_page();
				(info, current_page)
			}
		};

		let num_pages = total_rows.map(|total| info.num_pages(total));
		let has_next = match num_pages {
			Some(pages) => current_page + 1 < pages,
			None => info.limit() > 0 && rows.len() == info.limit(),
		};
		let controls = PageControls {
			current_page,
			num_pages,
			has_previous: current_page > 0,
			has_next,
			limit: info.limit(),
			limit_options: self.settings.limit_options().clone(),
		};

		Ok(TablePage {
			info,
			rows,
			total_rows,
			controls,
		})
	}

	fn fetch<S>(&self, source: &mut S, info: &PaginationInfo) -> TableResult<(Vec<KeyedRow>, Option<usize>)>
	where
		S: DataSource + ?Sized,
	{
		let page = source.obtain(info, self.rowkey_column.as_deref())?;
		let total_rows = page.total_rows;
		let rows = page
			.rows
			.into_map()?
			.into_iter()
			.map(|(key, row)| KeyedRow::new(key, row))
			.collect();
		Ok((rows, total_rows))
	}
}
