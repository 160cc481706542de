//! On-disk cache of introspected schema snapshots.
//!
//! One pretty-printed JSON artifact per key, written atomically. Any read
//! problem is reported as a miss by [`SchemaCache::get`] so a broken cache
//! never stops a run.

use std::fs::{self, OpenOptions};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use dataseed_core::{SCHEMA_VERSION, SourceSchema};

const KEY_BYTES: usize = 16;

/// Errors raised by cache reads and writes.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not determine a cache directory")]
    NoCacheDir,
    #[error("invalid cache key '{0}'")]
    InvalidKey(String),
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt cache artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache artifact {path} has schema version {found}, expected {expected}")]
    VersionMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },
    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Directory-backed schema snapshot cache.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    dir: PathBuf,
}

impl SchemaCache {
    /// Cache rooted at the platform cache directory.
    pub fn new() -> Result<Self, CacheError> {
        Ok(Self::with_dir(Self::default_cache_dir()?))
    }

    /// Cache rooted at `dir`. The directory is created on first write.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<platform cache dir>/dataseed/schemas`, falling back to `~/.cache`.
    pub fn default_cache_dir() -> Result<PathBuf, CacheError> {
        let base = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
            .ok_or(CacheError::NoCacheDir)?;
        Ok(base.join("dataseed").join("schemas"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex-encoded prefix of the SHA-256 of `identifier`.
    pub fn cache_key(identifier: &str) -> String {
        let digest = Sha256::digest(identifier.as_bytes());
        hex::encode(&digest[..KEY_BYTES])
    }

    /// Key for a configuration file, stable across relative spellings of
    /// the same path.
    pub fn key_for_path(path: &Path) -> String {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::cache_key(&resolved.display().to_string())
    }

    pub fn artifact_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() || !key.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Read the artifact for `key`. `Ok(None)` when nothing is cached.
    pub fn load(&self, key: &str) -> Result<Option<SourceSchema>, CacheError> {
        let path = self.artifact_path(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path)(err)),
        };

        let schema: SourceSchema =
            serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
                path: path.clone(),
                source,
            })?;
        if schema.schema_version != SCHEMA_VERSION {
            return Err(CacheError::VersionMismatch {
                path,
                found: schema.schema_version,
                expected: SCHEMA_VERSION.to_string(),
            });
        }
        Ok(Some(schema))
    }

    /// Like [`SchemaCache::load`], but errors are logged and become a miss.
    pub fn get(&self, key: &str) -> Option<SourceSchema> {
        match self.load(key) {
            Ok(Some(schema)) => {
                debug!(key, tables = schema.tables.len(), "schema cache hit");
                Some(schema)
            }
            Ok(None) => {
                debug!(key, "schema cache miss");
                None
            }
            Err(err) => {
                warn!(key, error = %err, "ignoring unreadable schema cache entry");
                None
            }
        }
    }

    /// Replace the artifact for `key` with `schema`.
    pub fn put(&self, key: &str, schema: &SourceSchema) -> Result<(), CacheError> {
        let path = self.artifact_path(key)?;
        let data = serde_json::to_vec_pretty(schema)?;
        self.invalidate(key)?;
        write_bytes_atomic(&path, &data).map_err(io_error(&path))?;
        debug!(key, path = %path.display(), "schema cached");
        Ok(())
    }

    /// Remove the artifact for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.artifact_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    /// Cached schema for `key`, or the result of `fetch` when `refresh` is
    /// set or the cache misses. A fetched schema is stored; a failed store
    /// is only logged.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        refresh: bool,
        fetch: F,
    ) -> Result<SourceSchema, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SourceSchema, E>>,
    {
        if !refresh {
            if let Some(schema) = self.get(key) {
                info!(key, "using cached schema");
                return Ok(schema);
            }
        }

        let schema = fetch().await?;
        if let Err(err) = self.put(key, &schema) {
            warn!(key, error = %err, "failed to store schema in cache");
        }
        Ok(schema)
    }
}

fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid cache path: {}", path.display()),
        )
    })?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}
