//! Error types for table state resolution and data access.

use reinhardt_forms::StateError;
use serde_json::json;
use thiserror::Error;

/// Errors raised while resolving table state or fetching a page of rows.
///
/// None of these are recovered from inside the crate. They reach the
/// rendering shell, which decides how to present them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
	/// Malformed settings or builder input, detected at build time.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// Submitted or declared state has the wrong shape.
	#[error("Validation error: {field}: {message}")]
	Validation {
		/// The offending field or column.
		field: String,
		/// What was wrong with it.
		message: String,
	},

	/// Row content discovered to be unusable while iterating.
	#[error("Data error: {0}")]
	Data(String),

	/// The data source does not offer the requested operation.
	#[error("Unsupported operation: {0}")]
	Unsupported(String),

	/// The SQL execution collaborator reported a failure.
	#[error("Query error: {0}")]
	Query(String),
}

/// Coarse classification of a [`TableError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	Configuration,
	Validation,
	Data,
	Unsupported,
	Query,
}

impl TableError {
	pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Validation {
			field: field.into(),
			message: message.into(),
		}
	}

	/// Returns the category of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Configuration(_) => ErrorKind::Configuration,
			Self::Validation { .. } => ErrorKind::Validation,
			Self::Data(_) => ErrorKind::Data,
			Self::Unsupported(_) => ErrorKind::Unsupported,
			Self::Query(_) => ErrorKind::Query,
		}
	}

	/// Payload returned to AJAX requests in place of the table fragment.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_tables::TableError;
	/// use serde_json::json;
	///
	/// let error = TableError::Data("row 3 has no column \"id\"".to_string());
	/// assert_eq!(
	/// 	error.to_json(),
	/// 	json!({"error": "Data error: row 3 has no column \"id\""})
	/// );
	/// ```
	pub fn to_json(&self) -> serde_json::Value {
		json!({ "error": self.to_string() })
	}
}

impl From<StateError> for TableError {
	fn from(error: StateError) -> Self {
		match error {
			StateError::Configuration(message) => Self::Configuration(message),
			StateError::Payload(message) => Self::validation("payload", message),
			StateError::Validation { field, message } => Self::Validation { field, message },
		}
	}
}

/// Result type alias for table operations.
pub type TableResult<T> = Result<T, TableError>;
