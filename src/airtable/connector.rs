//! The retrieval pipeline: cache-first fetching with a uniform result
//! contract for every consumer (render, connection test, manual refresh).

use color_eyre::Result;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, CacheStore};
use crate::config::ConnectionConfig;
use crate::formula::normalize_filters;

use super::cache_key::{TableQuery, CACHE_NAMESPACE};
use super::client::{AirtableClient, BuiltRequest};
use super::error::FetchError;
use super::types::FetchOutcome;

/// Pipeline object wiring the fetcher and cache together.
///
/// Constructed once at startup and passed by reference to every consumer;
/// there is no ambient global instance.
pub struct Connector<S: CacheStore> {
  client: AirtableClient,
  cache: CacheLayer<S>,
}

impl<S: CacheStore> Connector<S> {
  pub fn new(client: AirtableClient, cache: CacheLayer<S>) -> Self {
    Self { client, cache }
  }

  /// Retrieve records for a configuration, consulting the cache first.
  ///
  /// `bypass_cache` skips the cache read but not the write, so a forced
  /// refresh still leaves a fresh entry behind. Never returns `Err`: every
  /// failure folds into the outcome.
  pub async fn get_records(&self, config: &ConnectionConfig, bypass_cache: bool) -> FetchOutcome {
    self
      .get_records_with(config, bypass_cache, |request| {
        let client = self.client.clone();
        async move { client.fetch_table(&request).await }
      })
      .await
  }

  /// `get_records` with an injectable fetch step.
  ///
  /// The configuration check runs before the cache is consulted, so an
  /// invalid configuration never reads, writes, or fetches anything.
  pub async fn get_records_with<F, Fut>(
    &self,
    config: &ConnectionConfig,
    bypass_cache: bool,
    fetcher: F,
  ) -> FetchOutcome
  where
    F: FnOnce(BuiltRequest) -> Fut,
    Fut: Future<Output = std::result::Result<Option<Value>, FetchError>>,
  {
    let filter = normalize_filters(&config.filters);

    let request = match AirtableClient::build_request(config, &filter.formula) {
      Ok(request) => request,
      Err(err) => return FetchOutcome::from_error(String::new(), &err),
    };

    let key =
      TableQuery::new(&config.base_id, &config.table_name, &filter.conditions).cache_key();

    if !bypass_cache {
      // A failing store degrades to a miss.
      match self.cache.get::<FetchOutcome>(&config.cache, &key) {
        Ok(Some(cached)) => {
          debug!(%key, "cache hit");
          return cached;
        }
        Ok(None) => debug!(%key, "cache miss"),
        Err(err) => warn!(%key, "cache read failed: {}", err),
      }
    }

    let url = request.url.to_string();
    info!(%url, "fetching from Airtable");

    let outcome = match fetcher(request).await {
      Ok(payload) => FetchOutcome::from_success(url, payload, &filter),
      Err(err) => {
        warn!(%url, "fetch failed: {}", err);
        FetchOutcome::from_error(url, &err)
      }
    };

    // Failed outcomes are cached under the same policy as successes.
    if let Err(err) = self.cache.put(&config.cache, &key, &outcome) {
      warn!(%key, "cache write failed: {}", err);
    }

    outcome
  }

  /// Live connection test. Never reads or writes the cache; the raw payload
  /// is retained in the outcome for field discovery. Callers decide what,
  /// if anything, to persist from the result.
  pub async fn test_connection(&self, config: &ConnectionConfig) -> FetchOutcome {
    let filter = normalize_filters(&config.filters);

    let request = match AirtableClient::build_request(config, &filter.formula) {
      Ok(request) => request,
      Err(err) => return FetchOutcome::from_error(String::new(), &err),
    };

    let url = request.url.to_string();
    info!(%url, "testing connection");

    match self.client.fetch_table(&request).await {
      Ok(payload) => FetchOutcome::from_success(url, payload, &filter),
      Err(err) => FetchOutcome::from_error(url, &err),
    }
  }

  /// Remove the one cache entry matching this configuration's request
  /// shape, reporting whether one existed. Other entries are untouched, and
  /// no re-fetch happens here: the next retrieval repopulates the entry.
  pub fn invalidate(&self, config: &ConnectionConfig) -> Result<bool> {
    let filter = normalize_filters(&config.filters);
    let key =
      TableQuery::new(&config.base_id, &config.table_name, &filter.conditions).cache_key();

    debug!(%key, "invalidating cache entry");
    self.cache.invalidate(&key)
  }

  /// Remove every entry this crate ever cached, returning the exact count.
  /// Entries outside the namespace are never touched.
  pub fn clear_cache(&self) -> Result<usize> {
    let count = self.cache.clear_prefix(CACHE_NAMESPACE)?;
    info!(count, "cleared cache namespace");
    Ok(count)
  }
}
