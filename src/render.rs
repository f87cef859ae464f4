//! HTML fragment rendering for retrieval outcomes.
//!
//! Deliberately thin: it consumes the pipeline's uniform outcome and emits
//! self-contained markup with inline styles, suitable for embedding.

use serde_json::Value;

use crate::airtable::{FetchOutcome, FilterInfo};
use crate::config::ConnectionConfig;

/// Render an outcome as an embeddable HTML fragment.
pub fn render_fragment(config: &ConnectionConfig, outcome: &FetchOutcome) -> String {
  if !outcome.success {
    return render_error(&outcome.message);
  }

  let records = outcome.records();
  if records.is_empty() {
    return "<div style=\"padding: 10px; border: 1px solid #ddd;\">No records found.</div>"
      .to_string();
  }

  let mut html = String::new();

  if config.show_cache_info {
    html.push_str(&format!(
      "<div style=\"font-size: 0.8em; color: #666; margin-bottom: 10px;\">Last updated: {}</div>",
      outcome.retrieved_at.format("%Y-%m-%d %H:%M:%S")
    ));
  }

  if let Some(title) = &config.title {
    html.push_str(&format!("<h2>{}</h2>", esc(title)));
  }

  if let Some(filter) = &outcome.filter {
    html.push_str(&render_filter_info(filter));
  }

  if config.auto_refresh.enabled {
    let millis = config.auto_refresh.interval_secs * 1000;
    html.push_str(&format!(
      "<script>setTimeout(function() {{ location.reload(); }}, {});</script>",
      millis
    ));
  }

  html.push_str(&format!(
    "<div style=\"display: grid; grid-template-columns: repeat({}, 1fr); gap: 20px;\">",
    config.columns
  ));

  for record in &records {
    html.push_str("<div style=\"border: 1px solid #ddd; padding: 15px; background-color: #f9f9f9;\">");
    for field in &config.fields_to_display {
      if let Some(value) = record.fields.get(field) {
        html.push_str(&format!(
          "<p><strong>{}:</strong> {}</p>",
          esc(field),
          esc(&display_value(value))
        ));
      }
    }
    html.push_str("</div>");
  }

  html.push_str("</div>");
  html
}

/// Minimal styled error block shown on the render path.
pub fn render_error(message: &str) -> String {
  format!(
    "<div style=\"color: red; padding: 10px; border: 1px solid #ddd;\">Error fetching data: {}</div>",
    esc(message)
  )
}

fn render_filter_info(filter: &FilterInfo) -> String {
  let mut html = String::from("<div style=\"margin-bottom: 15px; font-style: italic;\">");

  match filter.conditions.as_slice() {
    [only] => {
      html.push_str(&format!(
        "Filtered by {}: {}",
        esc(&only.field),
        esc(&only.value)
      ));
    }
    many => {
      html.push_str("Filtered by multiple conditions: ");
      html.push_str("<ul style=\"margin-top: 5px; margin-bottom: 5px; margin-left: 20px;\">");
      for condition in many {
        html.push_str(&format!(
          "<li>{}: {}</li>",
          esc(&condition.field),
          esc(&condition.value)
        ));
      }
      html.push_str("</ul>");
    }
  }

  html.push_str(&format!(" ({} records)", filter.filtered_record_count));
  html.push_str("</div>");
  html
}

/// Field value as display text: strings render bare, everything else as
/// compact JSON.
fn display_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Escape text for HTML interpolation.
fn esc(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}
