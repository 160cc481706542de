use dataseed_core::{ColumnSchema, TableSchema};

use crate::matchers::Matcher;

pub(crate) const BOOLEAN_TYPES: &[&str] = &["bit", "bool", "boolean"];
pub(crate) const INTEGER_TYPES: &[&str] = &[
    "tinyint",
    "smallint",
    "int2",
    "int",
    "integer",
    "int4",
    "bigint",
    "int8",
    "serial",
    "smallserial",
    "bigserial",
];
pub(crate) const DECIMAL_TYPES: &[&str] = &[
    "numeric",
    "decimal",
    "real",
    "float",
    "float4",
    "float8",
    "double precision",
    "money",
    "smallmoney",
];
pub(crate) const UUID_TYPES: &[&str] = &["uuid", "uniqueidentifier"];
pub(crate) const DATE_TYPES: &[&str] = &["date"];
pub(crate) const TIMESTAMP_TYPES: &[&str] = &[
    "timestamp",
    "timestamp without time zone",
    "timestamp with time zone",
    "timestamptz",
    "datetime",
    "datetime2",
    "smalldatetime",
    "datetimeoffset",
];
pub(crate) const TIME_TYPES: &[&str] = &[
    "time",
    "time without time zone",
    "time with time zone",
    "timetz",
];
pub(crate) const BINARY_TYPES: &[&str] = &["bytea", "binary", "varbinary", "image"];

/// Integer key columns filled from a per-table counter.
#[derive(Debug, Clone, Copy)]
pub struct SequenceMatcher;

impl Matcher for SequenceMatcher {
    fn key(&self) -> &str {
        "sequence"
    }

    fn priority(&self) -> i32 {
        1000
    }

    fn matches(&self, column: &ColumnSchema, _table: &TableSchema) -> bool {
        if column.is_foreign_key {
            return false;
        }
        let base = column.base_type();
        column.is_identity
            || (column.is_primary_key && INTEGER_TYPES.contains(&base.as_str()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EmailMatcher;

impl Matcher for EmailMatcher {
    fn key(&self) -> &str {
        "email"
    }

    fn priority(&self) -> i32 {
        150
    }

    fn matches(&self, column: &ColumnSchema, _table: &TableSchema) -> bool {
        column.is_textual()
            && !column.is_foreign_key
            && column.name.to_lowercase().contains("email")
    }
}

/// Fallback matcher keyed on the declared base type.
#[derive(Debug, Clone, Copy)]
pub struct TypeMatcher {
    pub key: &'static str,
    pub types: &'static [&'static str],
}

impl Matcher for TypeMatcher {
    fn key(&self) -> &str {
        self.key
    }

    fn priority(&self) -> i32 {
        10
    }

    fn matches(&self, column: &ColumnSchema, _table: &TableSchema) -> bool {
        let base = column.base_type();
        self.types.contains(&base.as_str())
    }
}

pub const TYPE_MATCHERS: &[TypeMatcher] = &[
    TypeMatcher { key: "boolean", types: BOOLEAN_TYPES },
    TypeMatcher { key: "integer", types: INTEGER_TYPES },
    TypeMatcher { key: "decimal", types: DECIMAL_TYPES },
    TypeMatcher { key: "uuid", types: UUID_TYPES },
    TypeMatcher { key: "date", types: DATE_TYPES },
    TypeMatcher { key: "timestamp", types: TIMESTAMP_TYPES },
    TypeMatcher { key: "time", types: TIME_TYPES },
    TypeMatcher { key: "binary", types: BINARY_TYPES },
];
