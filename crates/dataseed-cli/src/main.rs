mod config;
mod registry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{info, warn};

use dataseed_core::{Error as CoreError, SourceSchema, validate_schema};
use dataseed_generate::output::write_tables_csv;
use dataseed_generate::{
    GenerateOptions, GenerationError, GeneratorRegistry, Orchestrator, SyntheticTableStrategy,
};
use dataseed_introspect::{Adapter, IntrospectOptions, PostgresAdapter, SchemaCache};
use dataseed_plan::{PlanError, estimate_row_cap, order_tables};

use config::{CacheConfig, LoadedConfig, Overrides, load_config};
use registry::{
    RegistryError, RunContext, RunPaths, RunRecord, RunStatus, collect_git_info, init_logging, start_run,
    write_json_atomic, write_run_record,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[source] toml::de::Error),
    #[error("no connection string: set `connection`, pass --connection or export DATABASE_URL")]
    MissingConnection,
    #[error("unsupported engine for connection string (expected postgres:// or postgresql://)")]
    UnsupportedEngine,
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Parser, Debug)]
#[command(name = "dataseed", version, about = "Schema-aware synthetic data generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the generation order and per-table row caps.
    Plan(CommonArgs),
    /// Generate rows and write CSV files into a new run directory.
    Generate(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "dataseed.toml")]
    config: PathBuf,
    /// Database connection string; overrides the config file.
    #[arg(long, value_name = "CONNECTION_STRING")]
    connection: Option<String>,
    /// Directory that receives run directories; overrides the config file.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Row cap per table; values <= 0 fall back to the minimum.
    #[arg(long, allow_negative_numbers = true)]
    max_rows_per_table: Option<i64>,
    /// Ignore any cached schema and introspect again.
    #[arg(long, default_value_t = false)]
    refresh_schema: bool,
}

impl CommonArgs {
    fn load(&self) -> Result<LoadedConfig, CliError> {
        load_config(
            &self.config,
            Overrides {
                connection: self.connection.clone(),
                out_dir: self.out_dir.clone(),
                max_rows_per_table: self.max_rows_per_table,
            },
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Plan(args) => run_plan(args).await,
        Command::Generate(args) => run_generate(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run_plan(args: CommonArgs) -> Result<(), CliError> {
    let loaded = args.load()?;
    init_logging(None)?;

    let schema = load_schema(&loaded, args.refresh_schema).await?;
    let plan = order_tables(&loaded.seeds, &schema);

    println!("{:>4}  {:<48} {:>8}  LIMITED BY", "#", "TABLE", "ROW CAP");
    for (position, table) in plan.order.iter().enumerate() {
        let cap = estimate_row_cap(table, &schema, loaded.config.max_rows_per_table);
        let limited_by = cap
            .limited_by
            .as_ref()
            .map(|limit| format!("{} ({} values)", limit.column, limit.cardinality))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {:<48} {:>8}  {}",
            position + 1,
            table.id().to_string(),
            cap.cap,
            limited_by
        );
    }
    for id in &plan.cyclic {
        println!("cycle: {id} placed after its acyclic dependencies");
    }
    for id in &plan.unresolved {
        println!("unresolved: {id} is not in the introspected schema");
    }

    Ok(())
}

async fn run_generate(args: CommonArgs) -> Result<(), CliError> {
    let loaded = args.load()?;

    let ctx = RunContext::new(loaded.config.out_dir.clone());
    let paths = start_run(&ctx)?;
    init_logging(Some(&paths.logs_path))?;

    let mut record = RunRecord {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        finished_at: None,
        status: RunStatus::Running,
        config_path: loaded.path.clone(),
        tables: loaded.config.tables.clone(),
        max_rows_per_table: loaded.config.max_rows_per_table,
        seed: loaded.config.seed,
        engine: None,
        database: None,
        rows_total: None,
        files: Vec::new(),
        error: None,
        git: collect_git_info(),
    };
    write_run_record(&paths, &record)?;
    info!(event = "run_started", run_id = %ctx.run_id, dir = %paths.root.display());

    let timer = Instant::now();
    let result = generate_into(&loaded, args.refresh_schema, &paths, &mut record).await;

    match &result {
        Ok(()) => {
            record.finish(RunStatus::Success);
            info!(
                event = "run_finished",
                status = "success",
                duration_ms = timer.elapsed().as_millis() as u64
            );
        }
        Err(err) => {
            record.error = Some(err.to_string());
            record.finish(RunStatus::Failed);
            tracing::error!(event = "run_finished", status = "failed", error = %err);
        }
    }
    write_run_record(&paths, &record)?;
    result?;

    println!("{}", paths.root.display());
    Ok(())
}

async fn generate_into(
    loaded: &LoadedConfig,
    refresh_schema: bool,
    paths: &RunPaths,
    record: &mut RunRecord,
) -> Result<(), CliError> {
    let schema = load_schema(loaded, refresh_schema).await?;
    record.engine = Some(schema.engine.clone());
    record.database = schema.database.clone();

    let options = GenerateOptions {
        max_rows_per_table: loaded.config.max_rows_per_table,
        seed: loaded.config.seed,
        ..GenerateOptions::default()
    };
    let strategy = SyntheticTableStrategy::new(GeneratorRegistry::with_builtins()?, &options);
    let orchestrator = Orchestrator::new(strategy, options);
    let outcome = orchestrator.run(&schema, &loaded.config.tables).await?;

    let files = write_tables_csv(&paths.root, &outcome.tables)?;
    for file in &files {
        info!(event = "csv_written", path = %file.display());
    }
    write_json_atomic(&paths.report_path, &outcome.report)?;

    record.rows_total = Some(outcome.report.rows_total);
    record.files = files
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .collect();
    Ok(())
}

/// Introspected schema, served from the cache unless disabled or refreshed.
async fn load_schema(loaded: &LoadedConfig, refresh: bool) -> Result<SourceSchema, CliError> {
    let connection = loaded.connection()?;
    detect_engine(&connection)?;
    let options = IntrospectOptions::with_schemas(loaded.config.schemas.clone());

    let fetch = move || async move {
        let pool = connect(&connection).await?;
        info!(event = "introspection_started");
        let schema = PostgresAdapter::new(pool).introspect(&options).await?;
        validate_schema(&schema)?;
        info!(event = "introspection_finished", tables = schema.tables.len());
        Ok::<_, CliError>(schema)
    };

    let Some(cache) = schema_cache(&loaded.config.cache) else {
        return fetch().await;
    };
    let key = SchemaCache::key_for_path(&loaded.path);
    cache.get_or_fetch(&key, refresh, fetch).await
}

/// Cache selected by the config; `None` when disabled or when no cache
/// directory can be resolved.
fn schema_cache(config: &CacheConfig) -> Option<SchemaCache> {
    if !config.enabled {
        return None;
    }
    match &config.dir {
        Some(dir) => Some(SchemaCache::with_dir(dir)),
        None => match SchemaCache::new() {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!(error = %err, "schema cache unavailable, introspecting without it");
                None
            }
        },
    }
}

async fn connect(connection: &str) -> Result<PgPool, CliError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(connection)
        .await?;
    Ok(pool)
}

fn detect_engine(conn: &str) -> Result<(), CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok(())
    } else {
        Err(CliError::UnsupportedEngine)
    }
}
