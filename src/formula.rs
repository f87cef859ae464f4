//! Filter normalization into Airtable's filterByFormula syntax.

use serde::{Deserialize, Serialize};

/// A single (field, value) equality condition against a table.
///
/// Conditions are combined with logical AND; there is no OR support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
  pub field: String,
  pub value: String,
}

impl FilterCondition {
  pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      value: value.into(),
    }
  }
}

/// Result of normalizing a list of raw conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFilter {
  /// The combined formula, empty when no condition survived.
  pub formula: String,
  /// The conditions that produced formula terms, in input order.
  pub conditions: Vec<FilterCondition>,
}

impl NormalizedFilter {
  /// True when no condition produced a formula term.
  pub fn is_empty(&self) -> bool {
    self.formula.is_empty()
  }
}

/// Normalize raw conditions into a single filterByFormula expression.
///
/// Conditions with an empty field or an empty-string value are dropped.
/// Each survivor emits `{Field}="Value"`; a single term stands alone, two or
/// more are wrapped in `AND(...)` joined by commas. Values are embedded
/// verbatim, embedded quotes included.
pub fn normalize_filters(filters: &[FilterCondition]) -> NormalizedFilter {
  let conditions: Vec<FilterCondition> = filters
    .iter()
    .filter(|f| !f.field.is_empty() && !f.value.is_empty())
    .cloned()
    .collect();

  let mut terms: Vec<String> = conditions
    .iter()
    .map(|f| format!("{{{}}}=\"{}\"", f.field, f.value))
    .collect();

  let formula = match terms.len() {
    0 => String::new(),
    1 => terms.swap_remove(0),
    _ => format!("AND({})", terms.join(",")),
  };

  NormalizedFilter {
    formula,
    conditions,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_list_produces_empty_formula() {
    let normalized = normalize_filters(&[]);
    assert!(normalized.is_empty());
    assert_eq!(normalized.formula, "");
    assert!(normalized.conditions.is_empty());
  }

  #[test]
  fn single_condition_has_no_and_wrapper() {
    let normalized = normalize_filters(&[FilterCondition::new("Status", "Active")]);
    assert_eq!(normalized.formula, "{Status}=\"Active\"");
    assert_eq!(normalized.conditions.len(), 1);
  }

  #[test]
  fn multiple_conditions_are_and_joined_in_input_order() {
    let normalized = normalize_filters(&[
      FilterCondition::new("Status", "Active"),
      FilterCondition::new("Type", "Resort"),
    ]);
    assert_eq!(normalized.formula, "AND({Status}=\"Active\",{Type}=\"Resort\")");
  }

  #[test]
  fn three_conditions_join_with_single_commas() {
    let normalized = normalize_filters(&[
      FilterCondition::new("A", "1"),
      FilterCondition::new("B", "2"),
      FilterCondition::new("C", "3"),
    ]);
    assert_eq!(normalized.formula, "AND({A}=\"1\",{B}=\"2\",{C}=\"3\")");
  }

  #[test]
  fn empty_field_or_value_is_dropped() {
    let normalized = normalize_filters(&[
      FilterCondition::new("", "Active"),
      FilterCondition::new("Status", ""),
      FilterCondition::new("Type", "Resort"),
    ]);
    assert_eq!(normalized.formula, "{Type}=\"Resort\"");
    assert_eq!(normalized.conditions, vec![FilterCondition::new("Type", "Resort")]);
  }

  #[test]
  fn zero_string_value_counts_as_present() {
    let normalized = normalize_filters(&[FilterCondition::new("Count", "0")]);
    assert_eq!(normalized.formula, "{Count}=\"0\"");
  }

  #[test]
  fn values_pass_through_verbatim() {
    let normalized = normalize_filters(&[FilterCondition::new("Name", "say \"hi\"")]);
    assert_eq!(normalized.formula, "{Name}=\"say \"hi\"\"");
  }
}
