use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use dataseed_core::{TableId, TableSchema};
use dataseed_plan::CapLimit;

/// Runtime value produced for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl GeneratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GeneratedValue::Null)
    }

    /// CSV rendering. `Null` becomes an empty field.
    pub fn to_csv(&self) -> String {
        match self {
            GeneratedValue::Null => String::new(),
            GeneratedValue::Bool(value) => value.to_string(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Float(value) => value.to_string(),
            GeneratedValue::Text(value) | GeneratedValue::Uuid(value) => value.clone(),
            GeneratedValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            GeneratedValue::Time(value) => value.format("%H:%M:%S").to_string(),
            GeneratedValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Stable textual key used to detect duplicate key values.
    pub(crate) fn unique_key(&self) -> String {
        match self {
            GeneratedValue::Null => "<null>".to_string(),
            GeneratedValue::Text(value) => format!("t:{value}"),
            GeneratedValue::Uuid(value) => format!("u:{}", value.to_lowercase()),
            other => other.to_csv(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) | GeneratedValue::Uuid(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// One `(column, value, declared type)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCell {
    pub column: String,
    pub value: GeneratedValue,
    pub data_type: String,
}

/// A generated row with cells in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedRow {
    pub cells: Vec<GeneratedCell>,
}

impl GeneratedRow {
    pub fn new(cells: Vec<GeneratedCell>) -> Self {
        Self { cells }
    }

    /// Value of `column`, matched case-insensitively.
    pub fn get(&self, column: &str) -> Option<&GeneratedValue> {
        self.cells
            .iter()
            .find(|cell| cell.column.eq_ignore_ascii_case(column))
            .map(|cell| &cell.value)
    }
}

/// Rows produced for one table. Immutable once appended to the run result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTable {
    pub schema: String,
    pub table: String,
    /// Column names in output order.
    pub columns: Vec<String>,
    pub rows: Vec<GeneratedRow>,
}

impl GeneratedTable {
    pub fn new(table: &TableSchema, rows: Vec<GeneratedRow>) -> Self {
        let mut columns: Vec<_> = table
            .columns
            .iter()
            .filter(|column| column.is_writable())
            .collect();
        columns.sort_by_key(|column| column.ordinal_position);
        Self {
            schema: table.schema.clone(),
            table: table.name.clone(),
            columns: columns.iter().map(|column| column.name.clone()).collect(),
            rows,
        }
    }

    pub fn id(&self) -> TableId {
        TableId::new(&self.schema, &self.table)
    }

    pub fn is(&self, id: &TableId) -> bool {
        id.is(&self.schema, &self.table)
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Configured per-table row maximum. Zero or negative means the floor.
    pub max_rows_per_table: i64,
    /// Run seed; the same seed and schema yield the same data.
    pub seed: u64,
    /// Maximum attempts to build a row with unique key values.
    pub max_attempts_row: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_rows_per_table: 100,
            seed: 42,
            max_attempts_row: 50,
        }
    }
}

/// Summary of a generated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub schema: String,
    pub table: String,
    pub configured_cap: u64,
    pub row_cap: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_limited_by: Option<String>,
    pub rows_generated: u64,
}

impl TableReport {
    pub(crate) fn new(table: &TableSchema, configured: u64, cap: u64, limit: Option<&CapLimit>) -> Self {
        Self {
            schema: table.schema.clone(),
            table: table.name.clone(),
            configured_cap: configured,
            row_cap: cap,
            cap_limited_by: limit.map(|limit| limit.column.clone()),
            rows_generated: 0,
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub tables: Vec<TableReport>,
    pub rows_total: u64,
    /// Tables appended after the dependency sort hit a cycle.
    pub cyclic: Vec<String>,
    /// Referenced tables missing from the schema snapshot.
    pub unresolved: Vec<String>,
    pub warnings: Vec<String>,
}

/// Ordered generated tables plus the run report.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub tables: Vec<GeneratedTable>,
    pub report: GenerationReport,
}
