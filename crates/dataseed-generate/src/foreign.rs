use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dataseed_core::RelationshipEdge;

use crate::model::{GeneratedTable, GeneratedValue};

/// Foreign-key values taken from one parent row, keyed by lower-cased child
/// column name.
pub type ParentValues = HashMap<String, GeneratedValue>;

/// Read-only view over tables generated earlier in the run.
#[derive(Debug, Clone, Copy)]
pub struct ForeignContext<'a> {
    generated: &'a [GeneratedTable],
}

impl<'a> ForeignContext<'a> {
    pub fn new(generated: &'a [GeneratedTable]) -> Self {
        Self { generated }
    }

    pub fn parent_table(&self, edge: &RelationshipEdge) -> Option<&'a GeneratedTable> {
        let parent = edge.parent();
        self.generated.iter().find(|table| table.is(&parent))
    }

    /// Sample one parent row for `edge` and copy every referenced column, so
    /// composite keys stay consistent.
    ///
    /// Returns `None` when the parent has not been generated, has no rows, or
    /// lacks one of the referenced columns.
    pub fn sample(&self, edge: &RelationshipEdge, rng: &mut ChaCha8Rng) -> Option<ParentValues> {
        let parent = self.parent_table(edge)?;
        if parent.rows.is_empty() {
            return None;
        }
        let row = &parent.rows[rng.random_range(0..parent.rows.len())];

        let mut values = ParentValues::new();
        for pair in &edge.columns {
            let value = row.get(&pair.parent_column)?;
            values.insert(pair.child_column.to_lowercase(), value.clone());
        }
        Some(values)
    }
}
