use dataseed_core::{Error as CoreError, TableId};

use crate::errors::{PlanError, Result};

/// Parse configured `schema.table` entries.
///
/// The first malformed entry aborts parsing; duplicates (case-insensitive)
/// are collapsed, keeping the first spelling.
pub fn parse_seed_tables<S: AsRef<str>>(entries: &[S]) -> Result<Vec<TableId>> {
    let mut seeds: Vec<TableId> = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.as_ref();
        let id = TableId::parse(entry).map_err(|err| match err {
            CoreError::InvalidTableId { reason, .. } => PlanError::InvalidSeed {
                entry: entry.to_string(),
                reason,
            },
            other => PlanError::InvalidSeed {
                entry: entry.to_string(),
                reason: other.to_string(),
            },
        })?;
        if !seeds.contains(&id) {
            seeds.push(id);
        }
    }

    Ok(seeds)
}
