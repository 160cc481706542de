use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// Identity of a table as `(schema, table)`.
///
/// Equality, ordering and hashing ignore ASCII and Unicode case so that
/// `dbo.Orders` and `DBO.orders` name the same table. The original spelling
/// is preserved for display.
#[derive(Debug, Clone)]
pub struct TableId {
    schema: String,
    table: String,
}

impl TableId {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse a `schema.table` reference.
    ///
    /// The value must split on `.` into exactly two non-empty tokens.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split('.').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidTableId {
                value: value.to_string(),
                reason: format!("expected 'schema.table', found {} part(s)", parts.len()),
            });
        }

        let schema = parts[0].trim();
        let table = parts[1].trim();
        if schema.is_empty() || table.is_empty() {
            return Err(Error::InvalidTableId {
                value: value.to_string(),
                reason: "schema and table must both be non-empty".to_string(),
            });
        }

        Ok(Self::new(schema, table))
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Case-insensitive comparison against a raw pair.
    pub fn is(&self, schema: &str, table: &str) -> bool {
        eq_ignore_case(&self.schema, schema) && eq_ignore_case(&self.table, table)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

impl PartialEq for TableId {
    fn eq(&self, other: &Self) -> bool {
        self.is(&other.schema, &other.table)
    }
}

impl Eq for TableId {}

impl Ord for TableId {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.schema, &other.schema)
            .then_with(|| cmp_ignore_case(&self.table, &other.table))
    }
}

impl PartialOrd for TableId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for TableId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in self.schema.chars().flat_map(char::to_lowercase) {
            ch.hash(state);
        }
        // separator keeps ("ab", "c") and ("a", "bc") apart
        '\u{0}'.hash(state);
        for ch in self.table.chars().flat_map(char::to_lowercase) {
            ch.hash(state);
        }
    }
}

pub(crate) fn eq_ignore_case(left: &str, right: &str) -> bool {
    cmp_ignore_case(left, right) == Ordering::Equal
}

fn cmp_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::*;

    #[test]
    fn parses_schema_and_table() {
        let id = TableId::parse("dbo.Orders").unwrap();
        assert_eq!(id.schema(), "dbo");
        assert_eq!(id.table(), "Orders");
        assert_eq!(id.to_string(), "dbo.Orders");
    }

    #[test]
    fn rejects_malformed_references() {
        for value in ["BadEntry", "a.b.c", ".orders", "dbo.", ""] {
            assert!(
                matches!(TableId::parse(value), Err(Error::InvalidTableId { .. })),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn identity_ignores_case() {
        let left = TableId::new("dbo", "Orders");
        let right = TableId::new("DBO", "orders");
        assert_eq!(left, right);

        let mut hashed = HashSet::new();
        hashed.insert(left.clone());
        assert!(hashed.contains(&right));

        let mut ordered = BTreeSet::new();
        ordered.insert(left);
        assert!(!ordered.insert(right));
    }

    #[test]
    fn orders_lexically_by_schema_then_table() {
        let mut ids = vec![
            TableId::new("sales", "Orders"),
            TableId::new("dbo", "customers"),
            TableId::new("dbo", "Addresses"),
        ];
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["dbo.Addresses", "dbo.customers", "sales.Orders"]
        );
    }
}
