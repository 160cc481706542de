use std::path::{Path, PathBuf};

use serde::Deserialize;

use dataseed_core::TableId;
use dataseed_plan::parse_seed_tables;

use crate::CliError;

const DEFAULT_MAX_ROWS: i64 = 100;
const DEFAULT_SEED: u64 = 42;

/// Contents of a `dataseed.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Falls back to `DATABASE_URL` when absent.
    #[serde(default)]
    pub connection: Option<String>,
    pub tables: Vec<String>,
    #[serde(default = "default_max_rows")]
    pub max_rows_per_table: i64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Restricts introspection to these schemas.
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: None,
        }
    }
}

fn default_max_rows() -> i64 {
    DEFAULT_MAX_ROWS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_cache_enabled() -> bool {
    true
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub connection: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub max_rows_per_table: Option<i64>,
}

/// A configuration with overrides applied and seeds already parsed.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
    pub seeds: Vec<TableId>,
}

impl LoadedConfig {
    /// Effective connection string: flag, then file, then `DATABASE_URL`.
    pub fn connection(&self) -> Result<String, CliError> {
        self.config
            .connection
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|value| !value.trim().is_empty())
            .ok_or(CliError::MissingConnection)
    }
}

pub fn parse_config(content: &str) -> Result<Config, CliError> {
    toml::from_str(content).map_err(CliError::ConfigParse)
}

/// Read, override and validate the configuration at `path`.
///
/// Seed entries are parsed here so a malformed entry fails before any
/// database or filesystem work.
pub fn load_config(path: &Path, overrides: Overrides) -> Result<LoadedConfig, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&content)?;
    apply_overrides(&mut config, overrides);
    let seeds = parse_seed_tables(&config.tables)?;

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config,
        seeds,
    })
}

fn apply_overrides(config: &mut Config, overrides: Overrides) {
    if let Some(connection) = overrides.connection {
        config.connection = Some(connection);
    }
    if let Some(out_dir) = overrides.out_dir {
        config.out_dir = out_dir;
    }
    if let Some(max_rows) = overrides.max_rows_per_table {
        config.max_rows_per_table = max_rows;
    }
}
