//! HTTP client for the Airtable REST API: request assembly and fetching.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ConnectionConfig;

use super::api_types;
use super::error::FetchError;

/// Root of the Airtable REST API.
pub const API_ROOT: &str = "https://api.airtable.com/v0";

/// Query parameter carrying the filter formula.
const FILTER_PARAM: &str = "filterByFormula";

/// Fixed timeout for table fetches.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully assembled request: URL plus the bearer credential.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
  pub url: Url,
  pub api_key: String,
}

/// Thin Airtable API client.
#[derive(Clone)]
pub struct AirtableClient {
  http: reqwest::Client,
}

impl AirtableClient {
  pub fn new() -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http })
  }

  /// Assemble the request URL and credential for a configuration.
  ///
  /// Fails with `MissingConfiguration` before any network attempt when the
  /// credential, base id, or table name is blank. The formula parameter is
  /// appended only when a formula exists.
  pub fn build_request(
    config: &ConnectionConfig,
    formula: &str,
  ) -> std::result::Result<BuiltRequest, FetchError> {
    let api_key = config.api_key.as_deref().unwrap_or("").trim();
    let base_id = config.base_id.trim();
    let table_name = config.table_name.trim();

    if api_key.is_empty() || base_id.is_empty() || table_name.is_empty() {
      return Err(FetchError::MissingConfiguration);
    }

    let mut url = Url::parse(&format!("{}/{}/{}", API_ROOT, base_id, table_name))
      .map_err(|e| FetchError::Transport(format!("Invalid request URL: {}", e)))?;

    if !formula.is_empty() {
      url.query_pairs_mut().append_pair(FILTER_PARAM, formula);
    }

    Ok(BuiltRequest {
      url,
      api_key: api_key.to_string(),
    })
  }

  /// Issue the GET and classify the response.
  ///
  /// Transport failures and non-200 statuses come back as `FetchError`; a
  /// 200 yields the parsed body (`None` when the body is not valid JSON).
  /// No retries happen here: a failed attempt is reported immediately.
  pub async fn fetch_table(
    &self,
    request: &BuiltRequest,
  ) -> std::result::Result<Option<Value>, FetchError> {
    debug!(url = %request.url, "requesting table");

    let response = self
      .http
      .get(request.url.clone())
      .bearer_auth(&request.api_key)
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .send()
      .await
      .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| FetchError::Transport(e.to_string()))?;
    let payload: Option<Value> = serde_json::from_str(&body).ok();

    if status != reqwest::StatusCode::OK {
      let message = payload.as_ref().and_then(api_types::error_message);
      return Err(FetchError::Remote {
        status: status.as_u16(),
        message,
        payload,
      });
    }

    Ok(payload)
  }
}
