//! Data table module.
//!
//! Settings, state resolution and the array, iterator and SQL data sources.

#[cfg(feature = "tables")]
pub use reinhardt_tables::*;
