//! Form state module.
//!
//! Decoding of submitted payloads and lookup of per-table state.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "forms")]
//! # {
//! use reinhardt_datatables::forms::FormState;
//!
//! let state = FormState::from_query_string("report", "report[_state][_pagination][_limit]=10", None).unwrap();
//! assert_eq!(state.pagination_limit("").unwrap(), Some(10));
//! # }
//! ```

#[cfg(feature = "forms")]
pub use reinhardt_forms::*;
