//! Resolution of settings and submitted state into a [`PaginationInfo`].

use crate::error::{TableError, TableResult};
use crate::search::SearchDirective;
use crate::settings::{DEFAULT_LIMIT, DataTableSettings};
use crate::sorting::{MultiSortStrategy, SortDirection, SortKey, SortOrder};
use crate::value::ComparisonMode;
use indexmap::IndexMap;
use reinhardt_forms::FormState;
use reinhardt_forms::keys::{CURRENT_PAGE_KEY, SEARCHING_KEY, SORTING_KEY};
use serde_json::Value;

/// What one request asks of a table: window, sort order and filters.
///
/// Built fresh per request by [`SettingsResolver`], or by hand with the
/// `with_*` methods. `limit == 0` means all rows and forces `offset` to 0.
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{PaginationInfo, SortDirection};
///
/// let info = PaginationInfo::new(10, 0)
/// 	.with_page(3)
/// 	.with_sort("name", SortDirection::Ascending);
///
/// assert_eq!(info.offset(), 30);
/// assert_eq!(info.num_pages(25), 3);
/// // Page 3 does not exist for 25 rows, so rendering uses the last one.
/// assert_eq!(info.current_page(25), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationInfo {
	sorting_order: SortOrder,
	limit: usize,
	offset: usize,
	search_states: IndexMap<String, SearchDirective>,
	total_rows: Option<usize>,
	comparisons: IndexMap<String, ComparisonMode>,
	multi_sort: MultiSortStrategy,
}

impl PaginationInfo {
	pub fn new(limit: usize, offset: usize) -> Self {
		Self {
			limit,
			offset: if limit == 0 { 0 } else { offset },
			..Self::default()
		}
	}

	/// Moves the window to the zero-based `page`.
	pub fn with_page(mut self, page: usize) -> Self {
		self.offset = page.saturating_mul(self.limit);
		self
	}

	/// Appends a sort column. Earlier columns take precedence.
	pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
		self.sorting_order.insert(column.into(), direction);
		self
	}

	pub fn with_search(mut self, column: impl Into<String>, directive: SearchDirective) -> Self {
		self.search_states.insert(column.into(), directive);
		self
	}

	pub fn with_comparison(mut self, column: impl Into<String>, mode: ComparisonMode) -> Self {
		self.comparisons.insert(column.into(), mode);
		self
	}

	pub fn with_multi_sort(mut self, strategy: MultiSortStrategy) -> Self {
		self.multi_sort = strategy;
		self
	}

	pub fn with_total_rows(mut self, total_rows: usize) -> Self {
		self.total_rows = Some(total_rows);
		self
	}

	pub fn sorting_order(&self) -> &SortOrder {
		&self.sorting_order
	}

	/// Page size, `0` for all rows.
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Absolute index of the first row in the window.
	pub fn offset(&self) -> usize {
		self.offset
	}

	pub fn search_states(&self) -> &IndexMap<String, SearchDirective> {
		&self.search_states
	}

	/// Directives that actually filter, skipping inert ones.
	pub fn active_searches(&self) -> impl Iterator<Item = (&String, &SearchDirective)> {
		self.search_states.iter().filter(|(_, d)| !d.is_inert())
	}

	pub fn has_active_search(&self) -> bool {
		self.active_searches().next().is_some()
	}

	/// Total row count known from settings, if any.
	pub fn total_rows(&self) -> Option<usize> {
		self.total_rows
	}

	pub fn multi_sort(&self) -> MultiSortStrategy {
		self.multi_sort
	}

	/// How cells of `column` compare, natural unless declared otherwise.
	pub fn comparison(&self, column: &str) -> ComparisonMode {
		self.comparisons.get(column).copied().unwrap_or_default()
	}

	/// The page the offset points at, before any clamping.
	pub fn nominal_page(&self) -> usize {
		if self.limit == 0 {
			0
		} else {
			self.offset / self.limit
		}
	}

	/// Number of pages needed for `total_rows`. Always 1 without a limit.
	pub fn num_pages(&self, total_rows: usize) -> usize {
		if self.limit == 0 {
			1
		} else {
			total_rows.div_ceil(self.limit)
		}
	}

	/// The page to render for `total_rows`, clamped to the last one that
	/// exists so an out-of-range request never shows an empty page.
	pub fn current_page(&self, total_rows: usize) -> usize {
		let pages = self.num_pages(total_rows);
		let nominal = self.nominal_page();
		if nominal >= pages {
			pages.saturating_sub(1)
		} else {
			nominal
		}
	}

	pub(crate) fn sort_keys(&self) -> Vec<SortKey> {
		self.sorting_order
			.iter()
			.map(|(column, direction)| SortKey::new(column.as_str(), *direction, self.comparison(column)))
			.collect()
	}
}

/// Reconciles a table's settings with the state a client submitted.
///
/// Resolution has no side effects: the same state and settings always give
/// the same [`PaginationInfo`].
#[derive(Debug, Clone, Copy)]
pub struct SettingsResolver<'a> {
	settings: Option<&'a DataTableSettings>,
	table_name: &'a str,
}

impl<'a> SettingsResolver<'a> {
	/// Resolver for `table_name`, the empty string naming the default table.
	pub fn new(settings: Option<&'a DataTableSettings>, table_name: &'a str) -> Self {
		Self {
			settings,
			table_name,
		}
	}

	/// Builds the [`PaginationInfo`] for this request.
	///
	/// Submitted values win over settings defaults. Sort state replaces the
	/// default order as a whole; search state overrides default filters one
	/// column at a time.
	///
	/// # Errors
	///
	/// Returns [`TableError::Validation`] naming the offending field when the
	/// state holds a bad limit or page, a sort value other than `asc`/`desc`,
	/// an unknown search type, a parameter list of the wrong shape, or a
	/// column the settings do not allow. No partial result is returned.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_forms::FormState;
	/// use reinhardt_tables::{DataTableSettings, SettingsResolver, SortDirection};
	/// use serde_json::json;
	///
	/// let payload = json!({"list": {"_state": {
	/// 	"_sorting_state": {"age": "desc"},
	/// 	"_pagination": {"_limit": "10", "_current_page": "2"}
	/// }}});
	/// let state = FormState::new("list", &payload, None).unwrap();
	/// let settings = DataTableSettings::default();
	///
	/// let info = SettingsResolver::new(Some(&settings), "").resolve(Some(&state)).unwrap();
	/// assert_eq!(info.limit(), 10);
	/// assert_eq!(info.offset(), 20);
	/// assert_eq!(info.sorting_order()["age"], SortDirection::Descending);
	/// ```
	pub fn resolve(&self, state: Option<&FormState>) -> TableResult<PaginationInfo> {
		let limit = self.resolve_limit(state)?;
		let offset = self.resolve_offset(state, limit)?;
		let sorting_order = self.resolve_sorting(state)?;
		let search_states = self.resolve_searching(state)?;

		let (comparisons, multi_sort, total_rows) = match self.settings {
			Some(settings) => (
				settings
					.columns()
					.iter()
					.map(|c| (c.key().to_string(), c.comparison_mode()))
					.collect(),
				settings.multi_sort(),
				settings.total_rows(),
			),
			None => (IndexMap::new(), MultiSortStrategy::default(), None),
		};

		let info = PaginationInfo {
			sorting_order,
			limit,
			offset,
			search_states,
			total_rows,
			comparisons,
			multi_sort,
		};
		tracing::debug!(
			table = self.table_name,
			limit = info.limit,
			offset = info.offset,
			sort_columns = info.sorting_order.len(),
			search_columns = info.search_states.len(),
			total_rows = ?info.total_rows,
			"resolved pagination info"
		);
		Ok(info)
	}

	fn resolve_limit(&self, state: Option<&FormState>) -> TableResult<usize> {
		if self.settings.is_some_and(|s| !s.pagination_enabled()) {
			return Ok(0);
		}
		if let Some(limit) = state
			.map(|s| s.pagination_limit(self.table_name))
			.transpose()?
			.flatten()
		{
			return Ok(limit);
		}
		Ok(self.settings.map_or(DEFAULT_LIMIT, DataTableSettings::default_limit))
	}

	fn resolve_offset(&self, state: Option<&FormState>, limit: usize) -> TableResult<usize> {
		if limit == 0 {
			return Ok(0);
		}
		let page = state
			.map(|s| s.current_page(self.table_name))
			.transpose()?
			.flatten()
			.unwrap_or(0);
		page.checked_mul(limit).ok_or_else(|| {
			TableError::validation(CURRENT_PAGE_KEY, format!("page {page} is out of range"))
		})
	}

	fn resolve_sorting(&self, state: Option<&FormState>) -> TableResult<SortOrder> {
		let mut order = SortOrder::new();
		match state.and_then(|s| s.sorting_state(self.table_name)) {
			None | Some(Value::Null) => {}
			Some(Value::String(s)) if s.is_empty() => {}
			Some(Value::Object(entries)) => {
				for (column, value) in entries {
					if let Some(direction) = SortDirection::from_state(column, value)? {
						self.check_column(column, SORTING_KEY)?;
						order.insert(column.clone(), direction);
					}
				}
			}
			Some(other) => {
				return Err(TableError::validation(
					SORTING_KEY,
					format!("expected a mapping of column to direction, got {other}"),
				));
			}
		}

		if order.is_empty() {
			if let Some(settings) = self.settings {
				order = settings.default_sorting().clone();
			}
		}
		Ok(order)
	}

	fn resolve_searching(
		&self,
		state: Option<&FormState>,
	) -> TableResult<IndexMap<String, SearchDirective>> {
		let mut searches = self
			.settings
			.map(|s| s.default_filtering().clone())
			.unwrap_or_default();

		match state.and_then(|s| s.searching_state(self.table_name)) {
			None | Some(Value::Null) => {}
			Some(Value::String(s)) if s.is_empty() => {}
			Some(Value::Object(entries)) => {
				for (column, value) in entries {
					let directive = SearchDirective::from_state(column, value)?;
					self.check_column(column, SEARCHING_KEY)?;
					searches.insert(column.clone(), directive);
				}
			}
			Some(other) => {
				return Err(TableError::validation(
					SEARCHING_KEY,
					format!("expected a mapping of column to directive, got {other}"),
				));
			}
		}
		Ok(searches)
	}

	/// With declared columns, submitted keys must name a column that allows
	/// the operation.
	fn check_column(&self, column: &str, sub_key: &str) -> TableResult<()> {
		let Some(columns) = self.settings.map(DataTableSettings::columns) else {
			return Ok(());
		};
		if columns.is_empty() {
			return Ok(());
		}
		let Some(declared) = columns.get(column) else {
			return Err(TableError::validation(column, "unknown column"));
		};
		let allowed = if sub_key == SORTING_KEY {
			declared.is_sortable()
		} else {
			declared.is_searchable()
		};
		if allowed {
			Ok(())
		} else {
			let operation = if sub_key == SORTING_KEY { "sortable" } else { "searchable" };
			Err(TableError::validation(column, format!("column is not {operation}")))
		}
	}
}

/// Shorthand for [`SettingsResolver::resolve`].
pub fn resolve(
	state: Option<&FormState>,
	settings: Option<&DataTableSettings>,
	table_name: &str,
) -> TableResult<PaginationInfo> {
	SettingsResolver::new(settings, table_name).resolve(state)
}
