use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::formula::FilterCondition;

/// Top-level configuration: named connections plus a default choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub connections: BTreeMap<String, ConnectionConfig>,
  pub default_connection: Option<String>,
}

/// One Airtable connection with its retrieval and display settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
  /// Display title for rendered fragments.
  pub title: Option<String>,
  /// Bearer credential. When absent from the file, resolved from
  /// AIRGRID_API_KEY or AIRTABLE_API_KEY at load time.
  pub api_key: Option<String>,
  #[serde(default)]
  pub base_id: String,
  #[serde(default)]
  pub table_name: String,
  #[serde(default)]
  pub filters: Vec<FilterCondition>,
  /// Field names shown in rendered fragments, in this order.
  #[serde(default)]
  pub fields_to_display: Vec<String>,
  #[serde(default)]
  pub cache: CachePolicy,
  #[serde(default)]
  pub auto_refresh: AutoRefreshPolicy,
  /// Show the "Last updated" line above rendered fragments.
  #[serde(default = "default_true")]
  pub show_cache_info: bool,
  /// Grid columns in rendered fragments.
  #[serde(default = "default_columns")]
  pub columns: u32,
}

impl Default for ConnectionConfig {
  fn default() -> Self {
    Self {
      title: None,
      api_key: None,
      base_id: String::new(),
      table_name: String::new(),
      filters: Vec::new(),
      fields_to_display: Vec::new(),
      cache: CachePolicy::default(),
      auto_refresh: AutoRefreshPolicy::default(),
      show_cache_info: true,
      columns: default_columns(),
    }
  }
}

/// Cache policy for one connection.
#[derive(Debug, Clone, Deserialize)]
pub struct CachePolicy {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Cache duration. Zero disables caching just like `enabled: false`.
  #[serde(default = "default_cache_minutes")]
  pub minutes: u64,
}

impl Default for CachePolicy {
  fn default() -> Self {
    Self {
      enabled: true,
      minutes: default_cache_minutes(),
    }
  }
}

impl CachePolicy {
  pub fn is_active(&self) -> bool {
    self.enabled && self.minutes > 0
  }
}

/// Page auto-reload policy. Only parameterizes the script the render layer
/// emits; nothing in the pipeline runs on a timer.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoRefreshPolicy {
  #[serde(default)]
  pub enabled: bool,
  /// Reload interval, clamped to 5..=3600 at load time.
  #[serde(default = "default_refresh_interval")]
  pub interval_secs: u64,
}

impl Default for AutoRefreshPolicy {
  fn default() -> Self {
    Self {
      enabled: false,
      interval_secs: default_refresh_interval(),
    }
  }
}

fn default_true() -> bool {
  true
}

fn default_columns() -> u32 {
  3
}

fn default_cache_minutes() -> u64 {
  5
}

fn default_refresh_interval() -> u64 {
  60
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./airgrid.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/airgrid/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/airgrid/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("airgrid.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("airgrid").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config.normalize())
  }

  /// Apply defaulting serde cannot express. Runs once at the load boundary;
  /// everything downstream works with the typed value as-is.
  fn normalize(mut self) -> Self {
    for connection in self.connections.values_mut() {
      if connection
        .api_key
        .as_deref()
        .map_or(true, |key| key.trim().is_empty())
      {
        connection.api_key = Self::env_api_key();
      }
      connection.auto_refresh.interval_secs =
        connection.auto_refresh.interval_secs.clamp(5, 3600);
    }
    self
  }

  /// Get the API key from environment variables.
  ///
  /// Checks AIRGRID_API_KEY first, then AIRTABLE_API_KEY as fallback.
  fn env_api_key() -> Option<String> {
    std::env::var("AIRGRID_API_KEY")
      .or_else(|_| std::env::var("AIRTABLE_API_KEY"))
      .ok()
  }

  /// Select a connection by explicit id, the configured default, or the
  /// single entry when only one exists.
  pub fn connection(&self, id: Option<&str>) -> Result<&ConnectionConfig> {
    if let Some(id) = id {
      return self
        .connections
        .get(id)
        .ok_or_else(|| eyre!("Unknown connection '{}'", id));
    }

    if let Some(default) = &self.default_connection {
      return self
        .connections
        .get(default)
        .ok_or_else(|| eyre!("Default connection '{}' is not defined", default));
    }

    if self.connections.len() == 1 {
      if let Some(only) = self.connections.values().next() {
        return Ok(only);
      }
    }

    Err(eyre!(
      "Multiple connections defined; pass --connection <id> or set default_connection"
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(yaml: &str) -> Config {
    let config: Config = serde_yaml::from_str(yaml).expect("parse");
    config
  }

  #[test]
  fn minimal_connection_gets_defaults() {
    let config = parse(
      r#"
connections:
  leads:
    api_key: "key"
    base_id: "appX"
    table_name: "Leads"
"#,
    );

    let leads = config.connection(Some("leads")).expect("connection");
    assert!(leads.cache.enabled);
    assert_eq!(leads.cache.minutes, 5);
    assert!(!leads.auto_refresh.enabled);
    assert_eq!(leads.auto_refresh.interval_secs, 60);
    assert!(leads.show_cache_info);
    assert_eq!(leads.columns, 3);
    assert!(leads.filters.is_empty());
  }

  #[test]
  fn filters_deserialize_in_order() {
    let config = parse(
      r#"
connections:
  leads:
    base_id: "appX"
    table_name: "Leads"
    filters:
      - field: "Status"
        value: "Active"
      - field: "Type"
        value: "Resort"
"#,
    );

    let leads = config.connection(Some("leads")).expect("connection");
    assert_eq!(leads.filters[0], FilterCondition::new("Status", "Active"));
    assert_eq!(leads.filters[1], FilterCondition::new("Type", "Resort"));
  }

  #[test]
  fn refresh_interval_is_clamped_at_load() {
    let config = parse(
      r#"
connections:
  fast:
    auto_refresh:
      enabled: true
      interval_secs: 1
  slow:
    auto_refresh:
      enabled: true
      interval_secs: 100000
"#,
    )
    .normalize();

    assert_eq!(
      config.connection(Some("fast")).expect("fast").auto_refresh.interval_secs,
      5
    );
    assert_eq!(
      config.connection(Some("slow")).expect("slow").auto_refresh.interval_secs,
      3600
    );
  }

  #[test]
  fn selection_falls_back_to_default_then_single() {
    let with_default = parse(
      r#"
default_connection: b
connections:
  a: { base_id: "appA", table_name: "A" }
  b: { base_id: "appB", table_name: "B" }
"#,
    );
    assert_eq!(
      with_default.connection(None).expect("default").base_id,
      "appB"
    );

    let single = parse(
      r#"
connections:
  only: { base_id: "appO", table_name: "O" }
"#,
    );
    assert_eq!(single.connection(None).expect("single").base_id, "appO");
  }

  #[test]
  fn ambiguous_selection_is_an_error() {
    let config = parse(
      r#"
connections:
  a: { base_id: "appA", table_name: "A" }
  b: { base_id: "appB", table_name: "B" }
"#,
    );
    assert!(config.connection(None).is_err());
    assert!(config.connection(Some("missing")).is_err());
  }
}
