//! Store contract for the time-bounded cache.

use chrono::{DateTime, Utc};
use color_eyre::Result;

/// A stored entry: opaque serialized payload plus its expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
  pub data: Vec<u8>,
  pub expires_at: DateTime<Utc>,
}

/// Namespaced key-value store with per-entry expiry.
///
/// Individual key operations are atomic within the store; the layers above
/// add no locking of their own.
pub trait CacheStore: Send + Sync {
  /// Look up an entry. Entries past expiry are reported as absent but left
  /// in place rather than purged by the read.
  fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

  /// Write an entry, replacing any existing one under the same key.
  fn put(&self, key: &str, data: &[u8], expires_at: DateTime<Utc>) -> Result<()>;

  /// Remove a single entry, reporting whether one existed.
  fn delete(&self, key: &str) -> Result<bool>;

  /// Remove every entry whose key starts with `prefix`, returning the exact
  /// count removed. Keys outside the prefix are untouched.
  fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}
