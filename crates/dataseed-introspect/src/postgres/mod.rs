use sqlx::PgPool;
use tracing::{debug, info};

use dataseed_core::{Result, SourceSchema};

use crate::adapter::Adapter;
use crate::options::IntrospectOptions;

mod mapper;
mod queries;

/// Adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn introspect(&self, opts: &IntrospectOptions) -> Result<SourceSchema> {
        introspect(&self.pool, opts).await
    }
}

/// Introspect Postgres with default options.
pub async fn introspect_postgres(pool: &PgPool) -> Result<SourceSchema> {
    introspect(pool, &IntrospectOptions::default()).await
}

/// Introspect a Postgres database according to the provided options.
///
/// Tables are read schema by schema in name order, so the snapshot is stable
/// for an unchanged database.
pub async fn introspect(pool: &PgPool, opts: &IntrospectOptions) -> Result<SourceSchema> {
    let mut snapshot = SourceSchema::new("postgres");
    snapshot.database = Some(queries::fetch_database_name(pool).await?);

    let schemas = mapper::filter_schemas(queries::list_schemas(pool).await?, opts);
    for schema_name in schemas {
        let tables = queries::list_tables_in_schema(pool, &schema_name).await?;
        debug!(schema = %schema_name, tables = tables.len(), "introspecting schema");

        for table_name in tables {
            let primary_key = mapper::map_primary_key(
                &schema_name,
                &table_name,
                queries::get_primary_key(pool, &schema_name, &table_name).await?,
            );
            let foreign_keys = mapper::map_foreign_keys(
                &schema_name,
                &table_name,
                queries::list_foreign_keys(pool, &schema_name, &table_name).await?,
            );
            let columns = mapper::map_columns(
                queries::list_columns(pool, &schema_name, &table_name).await?,
                primary_key.as_ref(),
                &foreign_keys,
            );
            let indexes = mapper::map_indexes(
                &schema_name,
                &table_name,
                queries::list_indexes(pool, &schema_name, &table_name).await?,
            );

            snapshot.tables.push(dataseed_core::TableSchema {
                schema: schema_name.clone(),
                name: table_name,
                columns,
            });
            snapshot.primary_keys.extend(primary_key);
            snapshot.relationships.extend(foreign_keys);
            snapshot.indexes.extend(indexes);
        }
    }

    info!(
        database = snapshot.database.as_deref().unwrap_or_default(),
        tables = snapshot.tables.len(),
        relationships = snapshot.relationships.len(),
        "introspection finished"
    );
    Ok(snapshot)
}
