use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{IndexConstraint, PrimaryKeyConstraint, RelationshipEdge};
use crate::ident::{TableId, eq_ignore_case};

const TEXT_TYPES: &[&str] = &[
    "char",
    "varchar",
    "nchar",
    "nvarchar",
    "character",
    "character varying",
    "bpchar",
    "text",
    "ntext",
    "citext",
];

/// Snapshot of a source database: tables, keys, indexes and relationships.
///
/// Built once per run by an introspection adapter (or loaded from the schema
/// cache) and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceSchema {
    /// Contract version of this snapshot format.
    pub schema_version: String,
    /// Database engine identifier (e.g. `postgres`).
    pub engine: String,
    /// Database name when available.
    pub database: Option<String>,
    pub tables: Vec<TableSchema>,
    pub relationships: Vec<RelationshipEdge>,
    pub primary_keys: Vec<PrimaryKeyConstraint>,
    pub indexes: Vec<IndexConstraint>,
}

impl SourceSchema {
    /// Empty snapshot for the current contract version.
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            schema_version: crate::SCHEMA_VERSION.to_string(),
            engine: engine.into(),
            database: None,
            tables: Vec::new(),
            relationships: Vec::new(),
            primary_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn table(&self, id: &TableId) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.is(id))
    }

    /// Edges in which `child` is the referencing table.
    pub fn parent_edges(&self, child: &TableId) -> impl Iterator<Item = &RelationshipEdge> + use<'_> {
        let child = child.clone();
        self.relationships
            .iter()
            .filter(move |edge| child.is(&edge.child_schema, &edge.child_table))
    }

    pub fn primary_key(&self, id: &TableId) -> Option<&PrimaryKeyConstraint> {
        self.primary_keys
            .iter()
            .find(|pk| id.is(&pk.schema, &pk.table))
    }

    pub fn indexes_of(&self, id: &TableId) -> impl Iterator<Item = &IndexConstraint> + use<'_> {
        let id = id.clone();
        self.indexes
            .iter()
            .filter(move |index| id.is(&index.schema, &index.table))
    }

    /// Columns guarded by a single-column primary key or a single-column
    /// unique (non-primary) index, in declaration order without duplicates.
    pub fn single_column_keys(&self, id: &TableId) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();

        if let Some(pk) = self.primary_key(id) {
            if let [column] = pk.columns.as_slice() {
                columns.push(column);
            }
        }

        for index in self.indexes_of(id) {
            if !index.is_unique || index.is_primary_key {
                continue;
            }
            if let [column] = index.columns.as_slice() {
                if !columns.iter().any(|seen| eq_ignore_case(seen, column)) {
                    columns.push(column);
                }
            }
        }

        columns
    }
}

/// A table with its ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn id(&self) -> TableId {
        TableId::new(&self.schema, &self.name)
    }

    pub fn is(&self, id: &TableId) -> bool {
        id.is(&self.schema, &self.name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .find(|column| eq_ignore_case(&column.name, name))
    }
}

/// Column metadata as introspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSchema {
    pub ordinal_position: i16,
    pub name: String,
    /// Declared type name as reported by the engine (e.g. `character varying(40)`).
    pub data_type: String,
    pub max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_identity: bool,
    pub is_computed: bool,
    pub default: Option<String>,
}

impl ColumnSchema {
    /// Lower-cased type name without any `(...)` modifier.
    pub fn base_type(&self) -> String {
        let lowered = self.data_type.to_lowercase();
        match lowered.find('(') {
            Some(idx) => {
                let (head, tail) = lowered.split_at(idx);
                // keep suffixes such as `timestamp(3) without time zone` readable
                let suffix = tail
                    .find(')')
                    .map(|end| tail[end + 1..].trim())
                    .unwrap_or("");
                if suffix.is_empty() {
                    head.trim().to_string()
                } else {
                    format!("{} {}", head.trim(), suffix)
                }
            }
            None => lowered.trim().to_string(),
        }
    }

    pub fn is_textual(&self) -> bool {
        let base = self.base_type();
        TEXT_TYPES.contains(&base.as_str())
    }

    /// Whether the column must be written by the generator (as opposed to
    /// being derived by the database).
    pub fn is_writable(&self) -> bool {
        !self.is_computed
    }
}
