use dataseed_core::{ColumnPair, ColumnSchema, RelationshipEdge, SourceSchema, TableSchema};

#[test]
fn serializes_schema_deterministically() {
    let mut schema = SourceSchema::new("postgres");
    schema.database = Some("db".to_string());

    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    let expected = r#"{
  "schema_version": "0.1",
  "engine": "postgres",
  "database": "db",
  "tables": [],
  "relationships": [],
  "primary_keys": [],
  "indexes": []
}"#;
    assert_eq!(json, expected);
}

#[test]
fn deserializes_into_equal_snapshot() {
    let mut schema = SourceSchema::new("postgres");
    schema.tables.push(TableSchema {
        schema: "sales".to_string(),
        name: "orders".to_string(),
        columns: vec![ColumnSchema {
            ordinal_position: 1,
            name: "customer_id".to_string(),
            data_type: "integer".to_string(),
            max_length: None,
            numeric_precision: Some(32),
            numeric_scale: Some(0),
            is_nullable: false,
            is_primary_key: false,
            is_foreign_key: true,
            is_identity: false,
            is_computed: false,
            default: None,
        }],
    });
    schema.relationships.push(RelationshipEdge {
        name: Some("fk_orders_customer".to_string()),
        parent_schema: "sales".to_string(),
        parent_table: "customers".to_string(),
        child_schema: "sales".to_string(),
        child_table: "orders".to_string(),
        columns: vec![ColumnPair {
            child_column: "customer_id".to_string(),
            parent_column: "id".to_string(),
        }],
    });

    let json = serde_json::to_string(&schema).expect("serialize schema");
    let decoded: SourceSchema = serde_json::from_str(&json).expect("deserialize schema");
    assert_eq!(decoded, schema);
}
