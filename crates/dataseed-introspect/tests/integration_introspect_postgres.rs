use std::env;

use anyhow::{Context, Result, anyhow};
use dataseed_core::TableId;
use dataseed_introspect::{Adapter, IntrospectOptions, PostgresAdapter};
use sqlx::{PgPool, postgres::PgPoolOptions};

const FIXTURE: &[&str] = &[
    "drop schema if exists dataseed_it cascade",
    "create schema dataseed_it",
    "create table dataseed_it.customers (
        id integer generated always as identity primary key,
        email varchar(120) not null unique,
        full_name varchar(100) not null,
        region char(2)
    )",
    "create table dataseed_it.orders (
        id bigserial primary key,
        customer_id integer not null references dataseed_it.customers(id),
        total numeric(10,2) not null,
        total_with_tax numeric(10,2) generated always as (total * 1.2) stored,
        flag boolean not null default false
    )",
    "create index idx_orders_total on dataseed_it.orders (total)",
];

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn reset_fixture(pool: &PgPool) -> Result<()> {
    for statement in FIXTURE {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture statement: {statement}"))?;
    }
    Ok(())
}

#[tokio::test]
async fn introspects_tables_keys_and_relationships() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL to run");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;

    reset_fixture(&pool).await?;

    let adapter = PostgresAdapter::new(pool.clone());
    assert_eq!(adapter.engine(), "postgres");
    let snapshot = adapter
        .introspect(&IntrospectOptions::with_schemas(vec!["dataseed_it".to_string()]))
        .await?;

    assert_eq!(snapshot.engine, "postgres");
    assert!(snapshot.tables.iter().all(|table| table.schema == "dataseed_it"));

    let customers = snapshot
        .table(&TableId::new("dataseed_it", "customers"))
        .ok_or_else(|| anyhow!("customers table missing"))?;
    let names: Vec<&str> = customers.columns.iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, vec!["id", "email", "full_name", "region"]);

    let id = customers.column("id").ok_or_else(|| anyhow!("id missing"))?;
    assert!(id.is_primary_key);
    assert!(id.is_identity);
    let region = customers.column("region").ok_or_else(|| anyhow!("region missing"))?;
    assert_eq!(region.max_length, Some(2));
    assert!(region.is_nullable);

    let keys = snapshot.single_column_keys(&customers.id());
    assert!(keys.contains(&"id"));
    assert!(keys.contains(&"email"));

    let orders = snapshot
        .table(&TableId::new("dataseed_it", "orders"))
        .ok_or_else(|| anyhow!("orders table missing"))?;
    let computed = orders
        .column("total_with_tax")
        .ok_or_else(|| anyhow!("total_with_tax missing"))?;
    assert!(computed.is_computed);
    assert!(computed.default.is_none());
    let customer_id = orders
        .column("customer_id")
        .ok_or_else(|| anyhow!("customer_id missing"))?;
    assert!(customer_id.is_foreign_key);

    let orders_id = orders.id();
    let edges: Vec<_> = snapshot.parent_edges(&orders_id).collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].parent(), customers.id());
    assert_eq!(edges[0].columns[0].child_column, "customer_id");
    assert_eq!(edges[0].columns[0].parent_column, "id");

    let total_index = snapshot
        .indexes_of(&orders_id)
        .find(|index| index.name == "idx_orders_total")
        .ok_or_else(|| anyhow!("idx_orders_total missing"))?;
    assert!(!total_index.is_unique);
    assert_eq!(total_index.columns, vec!["total"]);

    dataseed_core::validate_schema(&snapshot)?;

    sqlx::query("drop schema if exists dataseed_it cascade")
        .execute(&pool)
        .await?;
    Ok(())
}
