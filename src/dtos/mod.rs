//! DTOs module - Data Transfer Objects
//!
//! Entities travel as themselves in request and response bodies; only the
//! query-string parameters need a dedicated type.

pub mod query;

// Re-exports per facilitare l'import
pub use query::UpdateQuery;
