//! Error taxonomy for the retrieval pipeline.

use serde_json::Value;
use thiserror::Error;

/// Classified failure of a single retrieval attempt.
///
/// These never cross the pipeline boundary as `Err`: the connector folds
/// every variant into a `FetchOutcome` with `success = false`, so consumers
/// branch on the outcome, not on exceptions.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Required connection settings are absent. Detected before any I/O and
  /// never cached.
  #[error("Missing required API configuration (API Key, Base ID, or Table Name)")]
  MissingConfiguration,

  /// DNS, TLS, connection, or timeout failure below the HTTP layer.
  #[error("{0}")]
  Transport(String),

  /// The API answered with a non-200 status.
  #[error("API returned status code: {status}{}", remote_detail(.message))]
  Remote {
    status: u16,
    /// Error message extracted from the response body, when present.
    message: Option<String>,
    /// Parsed response body, kept for diagnostics.
    payload: Option<Value>,
  },
}

fn remote_detail(message: &Option<String>) -> String {
  match message {
    Some(m) => format!(" - {}", m),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_configuration_message_names_the_required_fields() {
    let message = FetchError::MissingConfiguration.to_string();
    assert!(message.contains("API Key"));
    assert!(message.contains("Base ID"));
    assert!(message.contains("Table Name"));
  }

  #[test]
  fn remote_error_includes_status_code() {
    let err = FetchError::Remote {
      status: 404,
      message: None,
      payload: None,
    };
    assert_eq!(err.to_string(), "API returned status code: 404");
  }

  #[test]
  fn remote_error_appends_backend_message_when_present() {
    let err = FetchError::Remote {
      status: 401,
      message: Some("Invalid authentication token".to_string()),
      payload: None,
    };
    assert_eq!(
      err.to_string(),
      "API returned status code: 401 - Invalid authentication token"
    );
  }
}
