use dataseed_core::{ColumnSchema, SourceSchema, TableSchema};
use serde::Serialize;
use tracing::info;

/// Row cap used when the configured maximum is zero or negative.
pub const MIN_ROW_CAP: u64 = 5;

/// Printable ASCII characters available to a one-character key.
const PRINTABLE_ASCII: u64 = 95;

const CHAR_TYPES: &[&str] = &[
    "char",
    "varchar",
    "nchar",
    "nvarchar",
    "character",
    "character varying",
    "bpchar",
];

/// Effective row cap for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCap {
    /// Rows the table may receive.
    pub cap: u64,
    /// Normalized configured maximum.
    pub configured: u64,
    /// Key column that lowered the cap, if any.
    pub limited_by: Option<CapLimit>,
}

/// Key column whose value domain is smaller than the configured cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapLimit {
    pub column: String,
    pub cardinality: u64,
}

/// Replace non-positive configured caps with [`MIN_ROW_CAP`].
pub fn normalize_row_cap(configured: i64) -> u64 {
    if configured <= 0 {
        MIN_ROW_CAP
    } else {
        configured as u64
    }
}

/// Distinct values a column's declared type can hold, when small enough
/// to matter. `None` means unbounded for capping purposes.
pub fn estimate_cardinality(column: &ColumnSchema) -> Option<u64> {
    let base = column.base_type();
    match base.as_str() {
        "bit" | "bool" | "boolean" => Some(2),
        "tinyint" => Some(256),
        "smallint" | "int2" => Some(65_536),
        other if CHAR_TYPES.contains(&other) => match column.max_length {
            Some(1) => Some(PRINTABLE_ASCII),
            Some(2) => Some(PRINTABLE_ASCII * PRINTABLE_ASCII),
            _ => None,
        },
        _ => None,
    }
}

/// Compute the safe row count for `table`.
///
/// Only single-column primary keys and single-column unique indexes are
/// considered; composite keys are not estimated.
pub fn estimate_row_cap(table: &TableSchema, schema: &SourceSchema, configured: i64) -> RowCap {
    let configured = normalize_row_cap(configured);
    let id = table.id();

    let mut cap = configured;
    let mut limited_by = None;
    for key in schema.single_column_keys(&id) {
        let Some(column) = table.column(key) else {
            continue;
        };
        let Some(cardinality) = estimate_cardinality(column) else {
            continue;
        };
        if cardinality < cap {
            cap = cardinality;
            limited_by = Some(CapLimit {
                column: column.name.clone(),
                cardinality,
            });
        }
    }

    if let Some(limit) = &limited_by {
        info!(
            table = %id,
            column = %limit.column,
            configured,
            cap,
            "row cap lowered to fit key cardinality"
        );
    }

    RowCap {
        cap,
        configured,
        limited_by,
    }
}

#[cfg(test)]
mod tests {
    use dataseed_core::{IndexConstraint, PrimaryKeyConstraint};

    use super::*;

    fn column(name: &str, data_type: &str, max_length: Option<i32>) -> ColumnSchema {
        ColumnSchema {
            ordinal_position: 1,
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length,
            numeric_precision: None,
            numeric_scale: None,
            is_nullable: false,
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: false,
            is_computed: false,
            default: None,
        }
    }

    fn schema_with(columns: Vec<ColumnSchema>, pk: &[&str], unique: &[Vec<&str>]) -> SourceSchema {
        let mut schema = SourceSchema::new("sqlserver");
        schema.tables.push(TableSchema {
            schema: "dbo".to_string(),
            name: "Flags".to_string(),
            columns,
        });
        if !pk.is_empty() {
            schema.primary_keys.push(PrimaryKeyConstraint {
                schema: "dbo".to_string(),
                table: "Flags".to_string(),
                name: Some("pk_flags".to_string()),
                columns: pk.iter().map(|c| c.to_string()).collect(),
            });
        }
        for (idx, cols) in unique.iter().enumerate() {
            schema.indexes.push(IndexConstraint {
                schema: "dbo".to_string(),
                table: "Flags".to_string(),
                name: format!("ux_{idx}"),
                columns: cols.iter().map(|c| c.to_string()).collect(),
                is_unique: true,
                is_primary_key: false,
            });
        }
        schema
    }

    #[test]
    fn bit_primary_key_caps_at_two() {
        let schema = schema_with(vec![column("id", "bit", None)], &["id"], &[]);
        let cap = estimate_row_cap(&schema.tables[0], &schema, 1000);
        assert_eq!(cap.cap, 2);
        assert_eq!(cap.configured, 1000);
        assert_eq!(cap.limited_by.map(|limit| limit.column), Some("id".to_string()));
    }

    #[test]
    fn cardinality_table() {
        assert_eq!(estimate_cardinality(&column("a", "BOOLEAN", None)), Some(2));
        assert_eq!(estimate_cardinality(&column("a", "tinyint", None)), Some(256));
        assert_eq!(estimate_cardinality(&column("a", "smallint", None)), Some(65_536));
        assert_eq!(estimate_cardinality(&column("a", "char(1)", Some(1))), Some(95));
        assert_eq!(
            estimate_cardinality(&column("a", "character varying(2)", Some(2))),
            Some(9025)
        );
        assert_eq!(estimate_cardinality(&column("a", "nvarchar", Some(3))), None);
        assert_eq!(estimate_cardinality(&column("a", "integer", None)), None);
        assert_eq!(estimate_cardinality(&column("a", "text", None)), None);
    }

    #[test]
    fn smallest_unique_column_wins() {
        let schema = schema_with(
            vec![
                column("id", "smallint", None),
                column("code", "char(2)", Some(2)),
                column("flag", "char(1)", Some(1)),
            ],
            &["id"],
            &[vec!["code"], vec!["flag"]],
        );
        let cap = estimate_row_cap(&schema.tables[0], &schema, 100_000);
        assert_eq!(cap.cap, 95);
        assert_eq!(cap.limited_by.map(|limit| limit.column), Some("flag".to_string()));
    }

    #[test]
    fn composite_keys_are_ignored() {
        let schema = schema_with(
            vec![column("a", "bit", None), column("b", "bit", None)],
            &["a", "b"],
            &[vec!["a", "b"]],
        );
        let cap = estimate_row_cap(&schema.tables[0], &schema, 50);
        assert_eq!(cap.cap, 50);
        assert!(cap.limited_by.is_none());
    }

    #[test]
    fn non_positive_configuration_uses_floor() {
        let schema = schema_with(vec![column("id", "integer", None)], &["id"], &[]);
        assert_eq!(estimate_row_cap(&schema.tables[0], &schema, 0).cap, MIN_ROW_CAP);
        assert_eq!(estimate_row_cap(&schema.tables[0], &schema, -3).cap, MIN_ROW_CAP);
    }

    #[test]
    fn cap_never_exceeds_configuration() {
        let schema = schema_with(vec![column("id", "bit", None)], &["id"], &[]);
        let cap = estimate_row_cap(&schema.tables[0], &schema, 1);
        assert_eq!(cap.cap, 1);
        assert!(cap.limited_by.is_none());
    }
}
