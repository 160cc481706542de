use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use dataseed_core::{ColumnSchema, RelationshipEdge, SourceSchema, TableSchema};

use crate::errors::GenerationError;
use crate::foreign::{ForeignContext, ParentValues};
use crate::generators::primitives::{integer_bounds, printable_code, sequence_value, tagged_text};
use crate::generators::{GeneratorContext, GeneratorRegistry};
use crate::matchers::column::INTEGER_TYPES;
use crate::model::{GenerateOptions, GeneratedCell, GeneratedRow, GeneratedTable, GeneratedValue};

/// Produces the rows of one table.
///
/// `generated` holds every table produced earlier in the run, in generation
/// order. Implementations read parent rows from it to fill foreign keys and
/// must return at most `row_cap` rows.
#[async_trait]
pub trait TableDataStrategy: Send + Sync {
    async fn generate_rows(
        &self,
        schema: &SourceSchema,
        table: &TableSchema,
        row_cap: u64,
        generated: &[GeneratedTable],
    ) -> Result<Vec<GeneratedRow>, GenerationError>;
}

/// Default strategy: registry-driven values, sampled foreign keys and
/// unique single-column keys.
pub struct SyntheticTableStrategy {
    registry: GeneratorRegistry,
    seed: u64,
    max_attempts_row: u32,
}

/// How a single-column key column gets values that stay distinct.
#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyDomain {
    /// Integer keys walk the type's domain by row index.
    Sequence { min: i64, max: i64 },
    /// One- or two-character keys enumerate printable ASCII by row index.
    Printable(u32),
    /// Other text keys take the generated value and, on a retry, a row tag.
    Tagged,
}

impl KeyDomain {
    fn for_column(column: &ColumnSchema) -> Option<Self> {
        let base = column.base_type();
        if INTEGER_TYPES.contains(&base.as_str()) {
            let (min, max) = integer_bounds(column);
            return Some(Self::Sequence { min, max });
        }
        if !column.is_textual() {
            return None;
        }
        match column.max_length {
            Some(len @ 1..=2) => Some(Self::Printable(len as u32)),
            _ => Some(Self::Tagged),
        }
    }
}

/// Per-table state shared by every row of one `generate_rows` call.
struct TableContext<'a> {
    table: &'a TableSchema,
    columns: Vec<&'a ColumnSchema>,
    edges: Vec<&'a RelationshipEdge>,
    keys: HashMap<String, KeyDomain>,
    foreign: ForeignContext<'a>,
}

impl<'a> TableContext<'a> {
    fn new(schema: &'a SourceSchema, table: &'a TableSchema, generated: &'a [GeneratedTable]) -> Self {
        let id = table.id();
        let mut columns: Vec<&ColumnSchema> = table
            .columns
            .iter()
            .filter(|column| column.is_writable())
            .collect();
        columns.sort_by_key(|column| column.ordinal_position);

        let edges: Vec<&RelationshipEdge> = schema.parent_edges(&id).collect();
        let keys = schema
            .single_column_keys(&id)
            .into_iter()
            .filter(|name| !is_edge_column(&edges, name))
            .filter_map(|name| {
                let column = table.column(name)?;
                let domain = KeyDomain::for_column(column)?;
                Some((name.to_lowercase(), domain))
            })
            .collect();

        Self {
            table,
            columns,
            edges,
            keys,
            foreign: ForeignContext::new(generated),
        }
    }
}

impl SyntheticTableStrategy {
    pub fn new(registry: GeneratorRegistry, options: &GenerateOptions) -> Self {
        Self {
            registry,
            seed: options.seed,
            max_attempts_row: options.max_attempts_row.max(1),
        }
    }

    fn build_row(
        &self,
        ctx: &TableContext<'_>,
        row_index: u64,
        attempt: u32,
        rng: &mut ChaCha8Rng,
        fallbacks: &mut HashSet<String>,
    ) -> Result<GeneratedRow, GenerationError> {
        let mut parent_values = ParentValues::new();
        for edge in &ctx.edges {
            if let Some(values) = ctx.foreign.sample(edge, rng) {
                for (column, value) in values {
                    parent_values.entry(column).or_insert(value);
                }
            }
        }

        let mut cells = Vec::with_capacity(ctx.columns.len());
        for column in &ctx.columns {
            let key = column.name.to_lowercase();
            let value = match parent_values.remove(&key) {
                Some(value) => value,
                None if is_edge_column(&ctx.edges, &key) => {
                    if column.is_nullable {
                        GeneratedValue::Null
                    } else {
                        if fallbacks.insert(key.clone()) {
                            warn!(
                                table = %ctx.table.id(),
                                column = %column.name,
                                "no parent rows available for foreign key, generating values"
                            );
                        }
                        self.generate_value(ctx.table, column, row_index, rng)?
                    }
                }
                None => match ctx.keys.get(&key) {
                    Some(domain) => {
                        self.generate_key(ctx.table, column, *domain, row_index, attempt, rng)?
                    }
                    None => self.generate_value(ctx.table, column, row_index, rng)?,
                },
            };
            cells.push(GeneratedCell {
                column: column.name.clone(),
                value,
                data_type: column.data_type.clone(),
            });
        }

        Ok(GeneratedRow::new(cells))
    }

    fn generate_key(
        &self,
        table: &TableSchema,
        column: &ColumnSchema,
        domain: KeyDomain,
        row_index: u64,
        attempt: u32,
        rng: &mut ChaCha8Rng,
    ) -> Result<GeneratedValue, GenerationError> {
        match domain {
            KeyDomain::Sequence { min, max } => {
                Ok(GeneratedValue::Int(sequence_value(row_index, min, max)))
            }
            KeyDomain::Printable(len) => Ok(GeneratedValue::Text(printable_code(row_index, len))),
            KeyDomain::Tagged => {
                let value = self.generate_value(table, column, row_index, rng)?;
                match value.as_str() {
                    Some(text) if attempt > 1 => Ok(GeneratedValue::Text(tagged_text(
                        text,
                        &row_tag(row_index),
                        column.max_length,
                    ))),
                    _ => Ok(value),
                }
            }
        }
    }

    fn generate_value(
        &self,
        table: &TableSchema,
        column: &ColumnSchema,
        row_index: u64,
        rng: &mut ChaCha8Rng,
    ) -> Result<GeneratedValue, GenerationError> {
        let ctx = GeneratorContext {
            table,
            column,
            row_index,
        };
        self.registry.generator_for(column, table).generate(&ctx, rng)
    }
}

#[async_trait]
impl TableDataStrategy for SyntheticTableStrategy {
    async fn generate_rows(
        &self,
        schema: &SourceSchema,
        table: &TableSchema,
        row_cap: u64,
        generated: &[GeneratedTable],
    ) -> Result<Vec<GeneratedRow>, GenerationError> {
        let id = table.id();
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.seed, &table_key(table)));

        let ctx = TableContext::new(schema, table, generated);
        let mut unique_sets: Vec<UniqueSet> = schema
            .single_column_keys(&id)
            .into_iter()
            .map(UniqueSet::new)
            .collect();
        let mut fallbacks = HashSet::new();

        let mut rows = Vec::new();
        for row_index in 0..row_cap {
            let mut accepted = None;
            for attempt in 1..=self.max_attempts_row {
                let row = self.build_row(&ctx, row_index, attempt, &mut rng, &mut fallbacks)?;
                if check_uniques(&mut unique_sets, &row) {
                    accepted = Some(row);
                    break;
                }
                debug!(table = %id, row_index, attempt, "duplicate key value, retrying row");
            }

            match accepted {
                Some(row) => rows.push(row),
                None => {
                    warn!(
                        table = %id,
                        rows = rows.len(),
                        row_cap,
                        attempts = self.max_attempts_row,
                        "unique key values exhausted, stopping table early"
                    );
                    break;
                }
            }
        }

        Ok(rows)
    }
}

fn is_edge_column(edges: &[&RelationshipEdge], key: &str) -> bool {
    edges.iter().any(|edge| {
        edge.columns
            .iter()
            .any(|pair| pair.child_column.eq_ignore_ascii_case(key))
    })
}

/// Base-36 rendering of the row index, distinct for every row.
fn row_tag(row_index: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rest = row_index;
    let mut tag = Vec::new();
    loop {
        tag.push(DIGITS[(rest % 36) as usize]);
        rest /= 36;
        if rest == 0 {
            break;
        }
    }
    tag.reverse();
    String::from_utf8_lossy(&tag).into_owned()
}

fn table_key(table: &TableSchema) -> String {
    table.id().to_string().to_lowercase()
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn check_uniques(sets: &mut [UniqueSet], row: &GeneratedRow) -> bool {
    let keys: Vec<Option<String>> = sets.iter().map(|set| set.key_for(row)).collect();
    let clash = sets
        .iter()
        .zip(&keys)
        .any(|(set, key)| key.as_ref().is_some_and(|key| set.seen.contains(key)));
    if clash {
        return false;
    }
    for (set, key) in sets.iter_mut().zip(keys) {
        if let Some(key) = key {
            set.seen.insert(key);
        }
    }
    true
}

struct UniqueSet {
    column: String,
    seen: HashSet<String>,
}

impl UniqueSet {
    fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
            seen: HashSet::new(),
        }
    }

    /// `None` for null values, which never collide.
    fn key_for(&self, row: &GeneratedRow) -> Option<String> {
        match row.get(&self.column) {
            Some(value) if !value.is_null() => Some(value.unique_key()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use dataseed_core::{IndexConstraint, PrimaryKeyConstraint, TableId};

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

    fn flags_schema() -> SourceSchema {
        let mut code = column("Code", "char(1)", Some(1));
        code.is_primary_key = true;
        let mut total = column("Total", "int", None);
        total.ordinal_position = 2;
        total.is_computed = true;

        let mut schema = SourceSchema::new("sqlserver");
        schema.tables.push(TableSchema {
            schema: "dbo".to_string(),
            name: "Flags".to_string(),
            columns: vec![code, total],
        });
        schema.primary_keys.push(PrimaryKeyConstraint {
            schema: "dbo".to_string(),
            table: "Flags".to_string(),
            name: None,
            columns: vec!["Code".to_string()],
        });
        schema
    }

    fn strategy(max_attempts_row: u32) -> SyntheticTableStrategy {
        let options = GenerateOptions {
            max_rows_per_table: 100,
            seed: 42,
            max_attempts_row,
        };
        SyntheticTableStrategy::new(GeneratorRegistry::with_builtins().unwrap(), &options)
    }

    #[tokio::test]
    async fn key_values_stay_unique_and_computed_columns_are_omitted() {
        let schema = flags_schema();
        let table = schema.table(&TableId::new("dbo", "flags")).unwrap();
        let rows = strategy(500).generate_rows(&schema, table, 40, &[]).await.unwrap();

        assert_eq!(rows.len(), 40);
        let codes: HashSet<String> = rows
            .iter()
            .map(|row| row.get("code").unwrap().to_csv())
            .collect();
        assert_eq!(codes.len(), 40);
        assert!(rows.iter().all(|row| row.get("Total").is_none()));
    }

    /// One-column table keyed by `key`, through either the primary key or a
    /// unique index.
    fn keyed_schema(table: &str, key: ColumnSchema, via_index: bool) -> SourceSchema {
        let mut schema = SourceSchema::new("sqlserver");
        let key_name = key.name.clone();
        schema.tables.push(TableSchema {
            schema: "dbo".to_string(),
            name: table.to_string(),
            columns: vec![key],
        });
        if via_index {
            schema.indexes.push(IndexConstraint {
                schema: "dbo".to_string(),
                table: table.to_string(),
                name: format!("ux_{table}_{key_name}"),
                columns: vec![key_name],
                is_unique: true,
                is_primary_key: false,
            });
        } else {
            schema.primary_keys.push(PrimaryKeyConstraint {
                schema: "dbo".to_string(),
                table: table.to_string(),
                name: None,
                columns: vec![key_name],
            });
        }
        schema
    }

    async fn distinct_keys(schema: &SourceSchema, table: &str, column: &str, cap: u64) -> usize {
        let table = schema.table(&TableId::new("dbo", table)).unwrap();
        let rows = strategy(50).generate_rows(schema, table, cap, &[]).await.unwrap();
        assert_eq!(rows.len() as u64, cap);
        rows.iter()
            .map(|row| row.get(column).unwrap().to_csv())
            .collect::<HashSet<String>>()
            .len()
    }

    #[tokio::test]
    async fn exhausted_keys_stop_the_table_early() {
        let mut flag = column("IsOn", "bit", None);
        flag.is_primary_key = true;
        let schema = keyed_schema("Switches", flag, false);
        let table = schema.table(&TableId::new("dbo", "switches")).unwrap();
        let rows = strategy(50).generate_rows(&schema, table, 5, &[]).await.unwrap();
        assert!(rows.len() <= 2);
        assert!(!rows.is_empty());
    }

    #[tokio::test]
    async fn two_character_keys_fill_their_whole_domain() {
        let mut code = column("Code", "char(2)", Some(2));
        code.is_primary_key = true;
        let schema = keyed_schema("Codes", code, false);
        assert_eq!(distinct_keys(&schema, "Codes", "Code", 95 * 95).await, 9025);
    }

    #[tokio::test]
    async fn long_named_text_keys_reach_the_cap() {
        let code = column("ProductCode", "varchar(10)", Some(10));
        let schema = keyed_schema("Widgets", code, true);
        assert_eq!(distinct_keys(&schema, "Widgets", "ProductCode", 50).await, 50);
    }

    #[tokio::test]
    async fn pick_list_keys_are_tagged_once_the_list_repeats() {
        let name = column("Name", "varchar(50)", Some(50));
        let schema = keyed_schema("Categories", name, true);
        assert_eq!(distinct_keys(&schema, "Categories", "Name", 100).await, 100);
    }

    #[tokio::test]
    async fn unique_integer_columns_follow_the_sequence() {
        let level = column("Level", "tinyint", None);
        let schema = keyed_schema("Levels", level, true);
        assert_eq!(distinct_keys(&schema, "Levels", "Level", 256).await, 256);
    }

    #[test]
    fn row_tags_are_base36() {
        assert_eq!(row_tag(0), "0");
        assert_eq!(row_tag(35), "z");
        assert_eq!(row_tag(36), "10");
        assert_eq!(row_tag(9025), "6yp");
    }

    #[tokio::test]
    async fn same_seed_same_rows() {
        let schema = flags_schema();
        let table = schema.table(&TableId::new("dbo", "flags")).unwrap();
        let first = strategy(50).generate_rows(&schema, table, 10, &[]).await.unwrap();
        let second = strategy(50).generate_rows(&schema, table, 10, &[]).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn seed_hash_depends_on_table() {
        assert_ne!(hash_seed(42, "dbo.orders"), hash_seed(42, "dbo.customers"));
        assert_eq!(hash_seed(42, "dbo.orders"), hash_seed(42, "dbo.orders"));
    }
}
