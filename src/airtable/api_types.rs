//! Serde-deserializable types matching Airtable API responses.
//!
//! These are separate from the domain types so raw payloads stay untouched
//! in outcomes while consumers get typed views on demand.

use serde::Deserialize;
use serde_json::Value;

/// Successful table response: a page of records.
#[derive(Debug, Deserialize)]
pub struct ApiTableResponse {
  #[serde(default)]
  pub records: Vec<ApiRecord>,
}

/// A single record: opaque id plus a field-name to value map.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecord {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub fields: serde_json::Map<String, Value>,
}

/// Number of entries in the payload's `records` array, 0 if absent.
pub fn record_count(payload: &Value) -> usize {
  payload
    .get("records")
    .and_then(Value::as_array)
    .map(|records| records.len())
    .unwrap_or(0)
}

/// Backend-supplied error message from a non-200 body, when present.
///
/// Airtable nests it under `error.message`; anything else yields `None`.
pub fn error_message(payload: &Value) -> Option<String> {
  payload
    .get("error")
    .and_then(|error| error.get("message"))
    .and_then(Value::as_str)
    .map(String::from)
}

/// Typed view of the records in a raw payload. Unparseable payloads yield
/// an empty list rather than an error.
pub fn parse_records(payload: &Value) -> Vec<ApiRecord> {
  serde_json::from_value::<ApiTableResponse>(payload.clone())
    .map(|response| response.records)
    .unwrap_or_default()
}

/// Sorted, de-duplicated field names appearing across the given records.
pub fn available_fields(records: &[ApiRecord]) -> Vec<String> {
  let mut fields: Vec<String> = records
    .iter()
    .flat_map(|record| record.fields.keys().cloned())
    .collect();
  fields.sort();
  fields.dedup();
  fields
}
