//! Database introspection adapters and the schema snapshot cache.

pub mod adapter;
pub mod cache;
pub mod options;
pub mod postgres;

pub use adapter::Adapter;
pub use cache::{CacheError, SchemaCache};
pub use options::IntrospectOptions;
pub use postgres::{PostgresAdapter, introspect_postgres};

pub use dataseed_core::SourceSchema;
