use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::ident::TableId;
use crate::schema::SourceSchema;

/// Validate internal consistency of a source schema.
///
/// This checks:
/// - duplicate tables (case-insensitive) and duplicate columns
/// - primary key and index columns exist on their table
/// - relationship columns exist on both ends when both tables are present
///
/// Keys, indexes and relationships that point at tables missing from the
/// snapshot are tolerated; the topology resolver drops them later.
pub fn validate_schema(schema: &SourceSchema) -> Result<()> {
    let mut catalog: BTreeMap<TableId, BTreeSet<String>> = BTreeMap::new();

    for table in &schema.tables {
        let id = table.id();
        if catalog.contains_key(&id) {
            return Err(Error::InvalidSchema(format!("duplicate table name: {id}")));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.to_lowercase()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {id}.{}",
                    column.name
                )));
            }
        }

        catalog.insert(id, columns);
    }

    for pk in &schema.primary_keys {
        if let Some(columns) = catalog.get(&pk.table_id()) {
            check_columns(columns, &pk.table_id(), &pk.columns, "primary key")?;
        }
    }

    for index in &schema.indexes {
        if let Some(columns) = catalog.get(&index.table_id()) {
            check_columns(columns, &index.table_id(), &index.columns, "index")?;
        }
    }

    for edge in &schema.relationships {
        if edge.columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "relationship {} -> {} has no columns",
                edge.child(),
                edge.parent()
            )));
        }

        let (Some(child_columns), Some(parent_columns)) =
            (catalog.get(&edge.child()), catalog.get(&edge.parent()))
        else {
            continue;
        };

        let child: Vec<String> = edge
            .columns
            .iter()
            .map(|pair| pair.child_column.clone())
            .collect();
        let parent: Vec<String> = edge
            .columns
            .iter()
            .map(|pair| pair.parent_column.clone())
            .collect();
        check_columns(child_columns, &edge.child(), &child, "foreign key")?;
        check_columns(parent_columns, &edge.parent(), &parent, "referenced")?;
    }

    Ok(())
}

fn check_columns(
    known: &BTreeSet<String>,
    table: &TableId,
    columns: &[String],
    what: &str,
) -> Result<()> {
    for column in columns {
        if !known.contains(&column.to_lowercase()) {
            return Err(Error::InvalidSchema(format!(
                "{what} column not found: {table}.{column}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ColumnPair, PrimaryKeyConstraint, RelationshipEdge};
    use crate::schema::{ColumnSchema, TableSchema};

    fn column(name: &str) -> ColumnSchema {
        ColumnSchema {
            ordinal_position: 1,
            name: name.to_string(),
            data_type: "integer".to_string(),
            max_length: None,
            numeric_precision: Some(32),
            numeric_scale: Some(0),
            is_nullable: false,
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: false,
            is_computed: false,
            default: None,
        }
    }

    fn table(name: &str, columns: &[&str]) -> TableSchema {
        TableSchema {
            schema: "public".to_string(),
            name: name.to_string(),
            columns: columns.iter().map(|name| column(name)).collect(),
        }
    }

    fn edge(child_column: &str, parent_table: &str) -> RelationshipEdge {
        RelationshipEdge {
            name: Some("fk".to_string()),
            parent_schema: "public".to_string(),
            parent_table: parent_table.to_string(),
            child_schema: "public".to_string(),
            child_table: "orders".to_string(),
            columns: vec![ColumnPair {
                child_column: child_column.to_string(),
                parent_column: "id".to_string(),
            }],
        }
    }

    #[test]
    fn rejects_duplicate_tables_ignoring_case() {
        let mut schema = SourceSchema::new("postgres");
        schema.tables.push(table("users", &["id"]));
        schema.tables.push(table("Users", &["id"]));

        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("duplicate table"));
    }

    #[test]
    fn rejects_missing_primary_key_column() {
        let mut schema = SourceSchema::new("postgres");
        schema.tables.push(table("users", &["id"]));
        schema.primary_keys.push(PrimaryKeyConstraint {
            schema: "public".to_string(),
            table: "users".to_string(),
            name: None,
            columns: vec!["user_id".to_string()],
        });

        assert!(validate_schema(&schema).is_err());
    }

    #[test]
    fn checks_relationship_columns_when_both_tables_exist() {
        let mut schema = SourceSchema::new("postgres");
        schema.tables.push(table("users", &["id"]));
        schema.tables.push(table("orders", &["id", "user_id"]));
        schema.relationships.push(edge("customer_id", "users"));

        assert!(validate_schema(&schema).is_err());

        schema.relationships[0] = edge("user_id", "users");
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn tolerates_relationships_to_unknown_tables() {
        let mut schema = SourceSchema::new("postgres");
        schema.tables.push(table("orders", &["id", "user_id"]));
        schema.relationships.push(edge("user_id", "users"));

        assert!(validate_schema(&schema).is_ok());
    }
}
