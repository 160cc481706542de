use async_trait::async_trait;

use dataseed_core::{Result, SourceSchema};

use crate::options::IntrospectOptions;

/// Trait implemented by database adapters that can introspect schemas.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Introspect the database and return a complete schema snapshot.
    async fn introspect(&self, opts: &IntrospectOptions) -> Result<SourceSchema>;
}
