//! Core contracts and helpers for dataseed.
//!
//! This crate defines the source-schema snapshot shared by the introspection
//! adapters, the planner and the generation engine.

pub mod constraints;
pub mod error;
pub mod ident;
pub mod schema;
pub mod validation;

pub use constraints::{ColumnPair, IndexConstraint, PrimaryKeyConstraint, RelationshipEdge};
pub use error::{Error, Result};
pub use ident::TableId;
pub use schema::{ColumnSchema, SourceSchema, TableSchema};
pub use validation::validate_schema;

/// Current contract version for serialized `SourceSchema` snapshots.
pub const SCHEMA_VERSION: &str = "0.1";
