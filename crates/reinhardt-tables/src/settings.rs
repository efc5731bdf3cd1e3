//! Caller-declared table defaults.

use crate::column::{Column, ColumnSet};
use crate::error::{TableError, TableResult};
use crate::search::SearchDirective;
use crate::sorting::{MultiSortStrategy, SortDirection, SortOrder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Page size used when neither the client nor the settings choose one.
pub const DEFAULT_LIMIT: usize = 25;

/// Plain, deserializable form of [`DataTableSettings`].
///
/// Load it from whatever settings format the application uses, then turn it
/// into settings with [`DataTableSettings::validate_and_build`].
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{DataTableConfig, DataTableSettings};
/// use serde_json::json;
///
/// let config: DataTableConfig = serde_json::from_value(json!({
/// 	"default_limit": 10,
/// 	"limit_options": {"10": "10", "20": "20", "0": "All"},
/// 	"default_sorting": {"name": "asc"},
/// 	"default_filtering": {"status": {"type": "EQUAL", "params": ["open"]}}
/// }))
/// .unwrap();
///
/// let settings = DataTableSettings::validate_and_build(config).unwrap();
/// assert_eq!(settings.default_limit(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTableConfig {
	pub default_limit: usize,
	pub total_rows: Option<usize>,
	pub limit_options: IndexMap<usize, String>,
	pub default_sorting: SortOrder,
	pub default_filtering: IndexMap<String, SearchDirective>,
	pub pagination_enabled: bool,
	pub columns: Vec<Column>,
	pub multi_sort: MultiSortStrategy,
}

impl Default for DataTableConfig {
	fn default() -> Self {
		Self {
			default_limit: DEFAULT_LIMIT,
			total_rows: None,
			limit_options: default_limit_options(),
			default_sorting: SortOrder::new(),
			default_filtering: IndexMap::new(),
			pagination_enabled: true,
			columns: Vec::new(),
			multi_sort: MultiSortStrategy::default(),
		}
	}
}

fn default_limit_options() -> IndexMap<usize, String> {
	[10, 25, 50, 100]
		.into_iter()
		.map(|n| (n, n.to_string()))
		.chain(std::iter::once((0, "All".to_string())))
		.collect()
}

/// Validated table defaults.
///
/// Immutable once built. [`with_total_rows`](Self::with_total_rows) hands
/// out a modified copy, since the row count is usually only known after the
/// data source ran its count step.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTableSettings {
	default_limit: usize,
	total_rows: Option<usize>,
	limit_options: IndexMap<usize, String>,
	default_sorting: SortOrder,
	default_filtering: IndexMap<String, SearchDirective>,
	pagination_enabled: bool,
	columns: ColumnSet,
	multi_sort: MultiSortStrategy,
}

impl Default for DataTableSettings {
	fn default() -> Self {
		let config = DataTableConfig::default();
		Self {
			default_limit: config.default_limit,
			total_rows: config.total_rows,
			limit_options: config.limit_options,
			default_sorting: config.default_sorting,
			default_filtering: config.default_filtering,
			pagination_enabled: config.pagination_enabled,
			columns: ColumnSet::new(),
			multi_sort: config.multi_sort,
		}
	}
}

/// Checks that a default sort or filter uses a declared column that allows
/// it. With no declared columns every key passes, as it does for submitted
/// state.
fn check_default_column(
	columns: &ColumnSet,
	key: &str,
	default: &str,
	allows: fn(&Column) -> bool,
	adjective: &str,
) -> TableResult<()> {
	if columns.is_empty() {
		return Ok(());
	}
	match columns.get(key) {
		None => Err(TableError::Configuration(format!(
			"default {default} refers to undeclared column {key:?}"
		))),
		Some(column) if !allows(column) => Err(TableError::Configuration(format!(
			"default {default} uses column {key:?}, which is not {adjective}"
		))),
		Some(_) => Ok(()),
	}
}

impl DataTableSettings {
	/// Starts a builder seeded with the defaults.
	pub fn builder() -> DataTableSettingsBuilder {
		DataTableSettingsBuilder::default()
	}

	/// Validates `config` and turns it into settings.
	///
	/// # Errors
	///
	/// Returns [`TableError::Configuration`] when the default limit is zero
	/// or missing from non-empty limit options, when a column key is empty
	/// or declared twice, when defaults refer to undeclared columns, when a
	/// default sort or filter uses a column that is not sortable or not
	/// searchable, or when a default filter has the wrong number of
	/// parameters.
	pub fn validate_and_build(config: DataTableConfig) -> TableResult<Self> {
		if config.default_limit == 0 {
			return Err(TableError::Configuration(
				"default_limit must be greater than zero".to_string(),
			));
		}
		if !config.limit_options.is_empty()
			&& !config.limit_options.contains_key(&config.default_limit)
		{
			return Err(TableError::Configuration(format!(
				"default_limit {} is not one of the limit options",
				config.default_limit
			)));
		}

		let mut columns = ColumnSet::new();
		for column in config.columns {
			if column.key().is_empty() {
				return Err(TableError::Configuration(
					"column key must not be empty".to_string(),
				));
			}
			let key = column.key().to_string();
			if columns.insert(column).is_some() {
				return Err(TableError::Configuration(format!(
					"column {key:?} is declared twice"
				)));
			}
		}

		for key in config.default_sorting.keys() {
			check_default_column(&columns, key, "sorting", Column::is_sortable, "sortable")?;
		}
		for (key, directive) in &config.default_filtering {
			check_default_column(&columns, key, "filtering", Column::is_searchable, "searchable")?;
			directive.check_arity().map_err(|e| {
				TableError::Configuration(format!("default filter for {key:?}: {e}"))
			})?;
		}

		Ok(Self {
			default_limit: config.default_limit,
			total_rows: config.total_rows,
			limit_options: config.limit_options,
			default_sorting: config.default_sorting,
			default_filtering: config.default_filtering,
			pagination_enabled: config.pagination_enabled,
			columns,
			multi_sort: config.multi_sort,
		})
	}

	/// Returns a copy that knows the total row count.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::DataTableSettings;
	///
	/// let settings = DataTableSettings::default();
	/// let counted = settings.with_total_rows(120);
	/// assert_eq!(settings.total_rows(), None);
	/// assert_eq!(counted.total_rows(), Some(120));
	/// ```
	pub fn with_total_rows(&self, total_rows: usize) -> Self {
		Self {
			total_rows: Some(total_rows),
			..self.clone()
		}
	}

	pub fn default_limit(&self) -> usize {
		self.default_limit
	}

	pub fn total_rows(&self) -> Option<usize> {
		self.total_rows
	}

	pub fn limit_options(&self) -> &IndexMap<usize, String> {
		&self.limit_options
	}

	pub fn default_sorting(&self) -> &SortOrder {
		&self.default_sorting
	}

	pub fn default_filtering(&self) -> &IndexMap<String, SearchDirective> {
		&self.default_filtering
	}

	pub fn pagination_enabled(&self) -> bool {
		self.pagination_enabled
	}

	pub fn columns(&self) -> &ColumnSet {
		&self.columns
	}

	pub fn multi_sort(&self) -> MultiSortStrategy {
		self.multi_sort
	}
}

/// Fluent builder for [`DataTableSettings`]. Nothing is checked until
/// [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use reinhardt_tables::{DataTableSettings, SearchDirective, SortDirection};
///
/// let settings = DataTableSettings::builder()
/// 	.default_limit(50)
/// 	.default_sort("created_at", SortDirection::Descending)
/// 	.default_filter("status", SearchDirective::equal("open"))
/// 	.build()
/// 	.unwrap();
///
/// assert_eq!(settings.default_limit(), 50);
/// assert!(DataTableSettings::builder().default_limit(0).build().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataTableSettingsBuilder {
	config: DataTableConfig,
}

impl DataTableSettingsBuilder {
	pub fn default_limit(mut self, limit: usize) -> Self {
		self.config.default_limit = limit;
		self
	}

	pub fn total_rows(mut self, total_rows: usize) -> Self {
		self.config.total_rows = Some(total_rows);
		self
	}

	/// Replaces the selectable page sizes. `0` stands for "all rows".
	pub fn limit_options<I, S>(mut self, options: I) -> Self
	where
		I: IntoIterator<Item = (usize, S)>,
		S: Into<String>,
	{
		self.config.limit_options = options.into_iter().map(|(n, s)| (n, s.into())).collect();
		self
	}

	pub fn default_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
		self.config.default_sorting.insert(column.into(), direction);
		self
	}

	pub fn default_filter(mut self, column: impl Into<String>, directive: SearchDirective) -> Self {
		self.config.default_filtering.insert(column.into(), directive);
		self
	}

	pub fn pagination_enabled(mut self, enabled: bool) -> Self {
		self.config.pagination_enabled = enabled;
		self
	}

	pub fn column(mut self, column: Column) -> Self {
		self.config.columns.push(column);
		self
	}

	pub fn multi_sort(mut self, strategy: MultiSortStrategy) -> Self {
		self.config.multi_sort = strategy;
		self
	}

	/// Validates and builds the settings.
	///
	/// # Errors
	///
	/// See [`DataTableSettings::validate_and_build`].
	pub fn build(self) -> TableResult<DataTableSettings> {
		DataTableSettings::validate_and_build(self.config)
	}
}
