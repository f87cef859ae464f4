//! Policy-aware cache layer over a store.

use chrono::{Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::config::CachePolicy;

use super::traits::CacheStore;

/// Cache layer applying a per-connection policy to a shared store.
///
/// The policy decides whether caching happens at all and for how long; the
/// store only ever sees concrete keys, payloads, and expiry instants.
pub struct CacheLayer<S: CacheStore> {
  storage: Arc<S>,
}

impl<S: CacheStore> CacheLayer<S> {
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Look up a cached value. Misses immediately when the policy disables
  /// caching or sets a zero duration; otherwise the store's expiry applies.
  pub fn get<T: DeserializeOwned>(&self, policy: &CachePolicy, key: &str) -> Result<Option<T>> {
    if !policy.is_active() {
      return Ok(None);
    }

    let entry = match self.storage.get(key)? {
      Some(entry) => entry,
      None => return Ok(None),
    };

    let value = serde_json::from_slice(&entry.data)
      .map_err(|e| eyre!("Failed to deserialize cache entry: {}", e))?;

    Ok(Some(value))
  }

  /// Store a value with expiry = now + the policy duration. No-op when the
  /// policy disables caching.
  pub fn put<T: Serialize>(&self, policy: &CachePolicy, key: &str, value: &T) -> Result<()> {
    if !policy.is_active() {
      return Ok(());
    }

    let data =
      serde_json::to_vec(value).map_err(|e| eyre!("Failed to serialize cache entry: {}", e))?;
    let expires_at = Utc::now() + Duration::seconds(policy.minutes as i64 * 60);

    self.storage.put(key, &data, expires_at)
  }

  /// Remove the single entry under `key`, reporting whether one existed.
  pub fn invalidate(&self, key: &str) -> Result<bool> {
    self.storage.delete(key)
  }

  /// Remove every entry under `prefix`, returning the count removed.
  pub fn clear_prefix(&self, prefix: &str) -> Result<usize> {
    self.storage.delete_prefix(prefix)
  }
}

impl<S: CacheStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
