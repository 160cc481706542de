use tracing::{info, warn};

use dataseed_core::SourceSchema;
use dataseed_plan::{estimate_row_cap, resolve_topology};

use crate::errors::GenerationError;
use crate::model::{
    GenerateOptions, GeneratedTable, GenerationOutcome, GenerationReport, TableReport,
};
use crate::strategy::TableDataStrategy;

/// Drives one generation run: topology, caps, then the strategy for each
/// table in order.
pub struct Orchestrator<S> {
    strategy: S,
    options: GenerateOptions,
}

impl<S: TableDataStrategy> Orchestrator<S> {
    pub fn new(strategy: S, options: GenerateOptions) -> Self {
        Self { strategy, options }
    }

    /// Generate every seed table and the parents it depends on.
    ///
    /// Tables are produced strictly one at a time so each one can sample
    /// foreign keys from the parents generated before it. A malformed seed
    /// fails before any table is generated.
    pub async fn run<T: AsRef<str>>(
        &self,
        schema: &SourceSchema,
        seeds: &[T],
    ) -> Result<GenerationOutcome, GenerationError> {
        let plan = resolve_topology(seeds, schema)?;
        let mut report = GenerationReport {
            seed: self.options.seed,
            cyclic: plan.cyclic.iter().map(ToString::to_string).collect(),
            unresolved: plan.unresolved.iter().map(ToString::to_string).collect(),
            ..GenerationReport::default()
        };
        if !plan.cyclic.is_empty() {
            report.warnings.push(format!(
                "foreign key cycle among {}; those tables were generated in lexical order",
                report.cyclic.join(", ")
            ));
        }

        info!(
            tables = plan.order.len(),
            seed = self.options.seed,
            "starting generation run"
        );

        let mut tables: Vec<GeneratedTable> = Vec::with_capacity(plan.order.len());
        for table in &plan.order {
            let id = table.id();
            let cap = estimate_row_cap(table, schema, self.options.max_rows_per_table);
            info!(table = %id, row_cap = cap.cap, "generating table");

            let mut rows = self
                .strategy
                .generate_rows(schema, table, cap.cap, &tables)
                .await?;
            if rows.len() as u64 > cap.cap {
                warn!(
                    table = %id,
                    rows = rows.len(),
                    row_cap = cap.cap,
                    "strategy returned more rows than the cap, truncating"
                );
                report.warnings.push(format!(
                    "{id}: {} rows truncated to the cap of {}",
                    rows.len(),
                    cap.cap
                ));
                rows.truncate(cap.cap as usize);
            }

            let mut table_report =
                TableReport::new(table, cap.configured, cap.cap, cap.limited_by.as_ref());
            table_report.rows_generated = rows.len() as u64;
            report.rows_total += table_report.rows_generated;
            report.tables.push(table_report);

            info!(table = %id, rows = rows.len(), "table generated");
            tables.push(GeneratedTable::new(table, rows));
        }

        if tables.is_empty() {
            warn!("no tables were generated; check the configured seed tables");
            report
                .warnings
                .push("no tables were generated".to_string());
        }

        info!(
            tables = tables.len(),
            rows = report.rows_total,
            "generation run finished"
        );

        Ok(GenerationOutcome { tables, report })
    }
}
