//! Error types for form state handling.

use thiserror::Error;

/// Errors raised while building or reading a [`FormState`](crate::FormState).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
	/// The form state was requested with invalid construction input.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// The raw request payload could not be decoded.
	#[error("Payload error: {0}")]
	Payload(String),

	/// A state value does not have the expected shape.
	#[error("Validation error: {field}: {message}")]
	Validation {
		/// Path of the offending value, joined with `.`
		field: String,
		/// What was wrong with it.
		message: String,
	},
}

impl StateError {
	pub(crate) fn validation(path: &[&str], message: impl Into<String>) -> Self {
		Self::Validation {
			field: path.join("."),
			message: message.into(),
		}
	}
}

/// Result type alias for form state operations.
pub type StateResult<T> = Result<T, StateError>;
