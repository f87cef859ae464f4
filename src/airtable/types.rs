//! Domain types for retrieval outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formula::{FilterCondition, NormalizedFilter};

use super::api_types::{self, ApiRecord};
use super::error::FetchError;

/// Filter metadata attached to a successful outcome when at least one
/// condition produced a formula term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInfo {
  pub formula: String,
  pub conditions: Vec<FilterCondition>,
  pub filtered_record_count: usize,
}

/// Uniform result of one retrieval attempt.
///
/// Every exit path of the pipeline (cache hit, live fetch, configuration
/// error) produces this same shape, so consumers never branch on where a
/// result came from. Immutable once produced; cached verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
  pub success: bool,
  pub message: String,
  /// The requested URL, empty when no request was ever built.
  pub url: String,
  /// Raw response payload; kept on remote failures for diagnostics.
  pub data: Option<Value>,
  pub record_count: usize,
  /// Wall-clock time the attempt completed.
  pub retrieved_at: DateTime<Utc>,
  pub filter: Option<FilterInfo>,
}

impl FetchOutcome {
  /// Assemble a successful outcome from a parsed response body.
  pub fn from_success(url: String, payload: Option<Value>, filter: &NormalizedFilter) -> Self {
    let record_count = payload.as_ref().map(api_types::record_count).unwrap_or(0);
    Self {
      success: true,
      message: "Data retrieved successfully".to_string(),
      url,
      data: payload,
      record_count,
      retrieved_at: Utc::now(),
      filter: filter_info(filter, record_count),
    }
  }

  /// Assemble a failed outcome from a classified error.
  pub fn from_error(url: String, error: &FetchError) -> Self {
    let data = match error {
      FetchError::Remote { payload, .. } => payload.clone(),
      _ => None,
    };
    Self {
      success: false,
      message: error.to_string(),
      url,
      data,
      record_count: 0,
      retrieved_at: Utc::now(),
      filter: None,
    }
  }

  /// Typed view of the records in the raw payload.
  pub fn records(&self) -> Vec<ApiRecord> {
    self
      .data
      .as_ref()
      .map(api_types::parse_records)
      .unwrap_or_default()
  }

  /// True when at least one filter condition shaped the request.
  pub fn filter_applied(&self) -> bool {
    self.filter.is_some()
  }
}

fn filter_info(filter: &NormalizedFilter, record_count: usize) -> Option<FilterInfo> {
  if filter.is_empty() {
    return None;
  }
  Some(FilterInfo {
    formula: filter.formula.clone(),
    conditions: filter.conditions.clone(),
    filtered_record_count: record_count,
  })
}
