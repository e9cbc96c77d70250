//! Core data models for the scholarship and resume service.
//!
//! `resume` holds the normalized record every storage backend returns plus
//! the internal superset the backends persist; `scholarship` holds the
//! static catalog entities. Both serialize as camelCase JSON via `serde`.

pub mod resume;
pub mod scholarship;
