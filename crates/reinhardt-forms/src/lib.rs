//! Form state handling for Reinhardt data tables
//!
//! This crate turns the nested payload of a form submission into a typed,
//! read-only [`FormState`] scoped to one named form:
//!
//! - Path-based lookup where absence is a normal result, never an error
//! - Per-table sorting, searching and pagination sub-state, namespaced so
//!   that several tables in one form keep independent state
//! - Forwarding of earlier wizard steps' state into later steps
//! - Decoding of bracket-notation query strings into nested payloads
//!
//! The request payload is always passed in explicitly; nothing here reads
//! ambient request data.

pub mod error;
pub mod keys;
pub mod payload;
pub mod state;

pub use error::{StateError, StateResult};
pub use payload::{nest_pairs, parse_nested_query};
pub use state::FormState;
