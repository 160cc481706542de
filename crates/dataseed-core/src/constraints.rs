use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ident::TableId;

/// Primary key definition preserving column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryKeyConstraint {
    pub schema: String,
    pub table: String,
    pub name: Option<String>,
    pub columns: Vec<String>,
}

impl PrimaryKeyConstraint {
    pub fn table_id(&self) -> TableId {
        TableId::new(&self.schema, &self.table)
    }
}

/// Index definition with its ordinal column list.
///
/// Non-unique indexes are captured too; only `is_unique && !is_primary_key`
/// entries take part in cardinality estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndexConstraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary_key: bool,
}

impl IndexConstraint {
    pub fn table_id(&self) -> TableId {
        TableId::new(&self.schema, &self.table)
    }
}

/// One `(child column, parent column)` pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnPair {
    pub child_column: String,
    pub parent_column: String,
}

/// Foreign-key relationship: `child` references `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipEdge {
    pub name: Option<String>,
    pub parent_schema: String,
    pub parent_table: String,
    pub child_schema: String,
    pub child_table: String,
    pub columns: Vec<ColumnPair>,
}

impl RelationshipEdge {
    pub fn parent(&self) -> TableId {
        TableId::new(&self.parent_schema, &self.parent_table)
    }

    pub fn child(&self) -> TableId {
        TableId::new(&self.child_schema, &self.child_table)
    }
}
