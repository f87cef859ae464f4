//! Cache store implementations: SQLite-backed and in-memory.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::traits::{CacheEntry, CacheStore};

/// Schema for the cache table. Expiry instants are stored as RFC 3339 text.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transient_cache (
    cache_key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    expires_at TEXT NOT NULL
);
"#;

/// SQLite-backed cache store.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the store at the default location under the platform data dir.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open a store backed by a database file at a specific path.
  pub fn open_at(path: &Path) -> Result<Self> {
    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("airgrid").join("cache.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStore for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, expires_at FROM transient_cache WHERE cache_key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    let (data, expires_at_str) = match row {
      Some(row) => row,
      None => return Ok(None),
    };

    let expires_at = parse_datetime(&expires_at_str)?;
    if Utc::now() > expires_at {
      // Expired rows count as a miss; they are overwritten or swept later.
      return Ok(None);
    }

    Ok(Some(CacheEntry { data, expires_at }))
  }

  fn put(&self, key: &str, data: &[u8], expires_at: DateTime<Utc>) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO transient_cache (cache_key, data, expires_at) VALUES (?, ?, ?)",
        params![key, data, expires_at.to_rfc3339()],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }

  fn delete(&self, key: &str) -> Result<bool> {
    let conn = self.lock()?;

    let removed = conn
      .execute("DELETE FROM transient_cache WHERE cache_key = ?", params![key])
      .map_err(|e| eyre!("Failed to delete cache entry: {}", e))?;

    Ok(removed > 0)
  }

  fn delete_prefix(&self, prefix: &str) -> Result<usize> {
    let conn = self.lock()?;

    // substr comparison instead of LIKE: prefixes may contain `_`, which
    // LIKE treats as a wildcard.
    let removed = conn
      .execute(
        "DELETE FROM transient_cache WHERE substr(cache_key, 1, ?1) = ?2",
        params![prefix.len() as i64, prefix],
      )
      .map_err(|e| eyre!("Failed to sweep cache entries: {}", e))?;

    Ok(removed)
  }
}

/// Parse an RFC 3339 timestamp stored by `put`.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

/// In-memory cache store. Cloning shares the underlying map, which lets
/// tests keep a handle on the store a layer owns.
#[derive(Clone, Default)]
pub struct MemoryStorage {
  entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
    self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStore for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let entries = self.lock()?;
    let entry = match entries.get(key) {
      Some(entry) => entry.clone(),
      None => return Ok(None),
    };

    if Utc::now() > entry.expires_at {
      return Ok(None);
    }

    Ok(Some(entry))
  }

  fn put(&self, key: &str, data: &[u8], expires_at: DateTime<Utc>) -> Result<()> {
    let mut entries = self.lock()?;
    entries.insert(
      key.to_string(),
      CacheEntry {
        data: data.to_vec(),
        expires_at,
      },
    );
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<bool> {
    let mut entries = self.lock()?;
    Ok(entries.remove(key).is_some())
  }

  fn delete_prefix(&self, prefix: &str) -> Result<usize> {
    let mut entries = self.lock()?;
    let before = entries.len();
    entries.retain(|key, _| !key.starts_with(prefix));
    Ok(before - entries.len())
  }
}
