//! Cache key derivation from the request shape.

use sha2::{Digest, Sha256};

use crate::formula::FilterCondition;

/// Shared prefix for every cache entry this crate creates. The bulk clear
/// operation sweeps exactly this namespace and nothing else.
pub const CACHE_NAMESPACE: &str = "airgrid_data_";

/// The parts of a configuration that affect the response payload.
///
/// The credential, cache policy, and display parameters are excluded by
/// construction: the cached payload is identical regardless of how it is
/// displayed or which token fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
  pub base_id: String,
  pub table_name: String,
  pub filters: Vec<FilterCondition>,
}

impl TableQuery {
  /// Build a query shape from raw identifiers and normalized conditions.
  /// Identifiers are trimmed; configs that fetch the same URL share a key.
  pub fn new(base_id: &str, table_name: &str, filters: &[FilterCondition]) -> Self {
    Self {
      base_id: base_id.trim().to_string(),
      table_name: table_name.trim().to_string(),
      filters: filters.to_vec(),
    }
  }

  /// Deterministic, namespaced cache key for this query shape.
  pub fn cache_key(&self) -> String {
    let filters: Vec<[&str; 2]> = self
      .filters
      .iter()
      .map(|f| [f.field.as_str(), f.value.as_str()])
      .collect();
    let canonical = serde_json::json!({
      "base_id": self.base_id,
      "table_name": self.table_name,
      "filters": filters,
    });

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    format!("{}{}", CACHE_NAMESPACE, hex::encode(hasher.finalize()))
  }
}
