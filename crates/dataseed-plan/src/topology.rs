use std::collections::{BTreeMap, BTreeSet, VecDeque};

use dataseed_core::{SourceSchema, TableId, TableSchema};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::seeds::parse_seed_tables;

/// Population-safe insertion order for a set of seed tables.
#[derive(Debug, Clone)]
pub struct TopologyPlan<'a> {
    /// Tables in generation order: parents first, cyclic leftovers last.
    pub order: Vec<&'a TableSchema>,
    /// Tables appended after the sort stalled on a dependency cycle.
    pub cyclic: Vec<TableId>,
    /// Identifiers from the closure with no table in the snapshot.
    pub unresolved: Vec<TableId>,
}

impl TopologyPlan<'_> {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, id: &TableId) -> Option<usize> {
        self.order.iter().position(|table| table.is(id))
    }
}

/// Resolve configured `schema.table` seeds into an insertion order.
///
/// Malformed seeds are the only error. Unknown tables are dropped and cycles
/// are broken by appending the remaining tables in lexical order.
pub fn resolve_topology<'a, S: AsRef<str>>(
    seeds: &[S],
    schema: &'a SourceSchema,
) -> Result<TopologyPlan<'a>> {
    let seeds = parse_seed_tables(seeds)?;
    Ok(order_tables(&seeds, schema))
}

/// Tables reachable from `seeds` by following child → parent edges.
pub fn dependency_closure(seeds: &[TableId], schema: &SourceSchema) -> BTreeSet<TableId> {
    let mut closure: BTreeSet<TableId> = seeds.iter().cloned().collect();
    let mut queue: VecDeque<TableId> = seeds.iter().cloned().collect();

    while let Some(child) = queue.pop_front() {
        for edge in schema.parent_edges(&child) {
            let parent = edge.parent();
            if closure.insert(parent.clone()) {
                debug!(child = %child, parent = %parent, "parent table added to closure");
                queue.push_back(parent);
            }
        }
    }

    closure
}

/// Order already-parsed seeds with Kahn's algorithm over their closure.
pub fn order_tables<'a>(seeds: &[TableId], schema: &'a SourceSchema) -> TopologyPlan<'a> {
    let closure = dependency_closure(seeds, schema);

    let mut tables: BTreeMap<TableId, &'a TableSchema> = BTreeMap::new();
    let mut unresolved = Vec::new();
    for id in closure {
        match schema.table(&id) {
            Some(table) => {
                tables.insert(id, table);
            }
            None => {
                debug!(table = %id, "table not found in source schema, skipping");
                unresolved.push(id);
            }
        }
    }

    let mut pending: BTreeMap<TableId, BTreeSet<TableId>> = tables
        .keys()
        .map(|id| (id.clone(), BTreeSet::new()))
        .collect();
    for edge in &schema.relationships {
        let parent = edge.parent();
        let child = edge.child();
        if !tables.contains_key(&parent) {
            continue;
        }
        if let Some(parents) = pending.get_mut(&child) {
            parents.insert(parent);
        }
    }

    let mut ready: BTreeSet<TableId> = pending
        .iter()
        .filter(|(_, parents)| parents.is_empty())
        .map(|(id, _)| id.clone())
        .collect();
    for id in &ready {
        pending.remove(id);
    }

    let mut order = Vec::with_capacity(tables.len());
    while let Some(next) = ready.pop_first() {
        let mut unblocked = Vec::new();
        for (id, parents) in pending.iter_mut() {
            if parents.remove(&next) && parents.is_empty() {
                unblocked.push(id.clone());
            }
        }
        for id in unblocked {
            pending.remove(&id);
            ready.insert(id);
        }
        if let Some(table) = tables.get(&next) {
            order.push(*table);
        }
    }

    let cyclic: Vec<TableId> = pending.into_keys().collect();
    if !cyclic.is_empty() {
        let names: Vec<String> = cyclic.iter().map(ToString::to_string).collect();
        warn!(
            tables = %names.join(", "),
            "foreign key cycle detected, appending tables in arbitrary order"
        );
        for id in &cyclic {
            if let Some(table) = tables.get(id) {
                order.push(*table);
            }
        }
    }

    TopologyPlan {
        order,
        cyclic,
        unresolved,
    }
}
