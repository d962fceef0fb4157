//! Keyword rules for option discovery and the predefined fallback table.
//!
//! Both ship as built-in defaults verified against the reference
//! business-card product, and both can be overridden with a YAML file
//! (see `config/options.yaml`) so operators can react to markup drift
//! without a rebuild.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::OptionAxis;
use crate::ConfigError;

/// Declarative discovery rule for one query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRule {
    /// Query parameter the axis controls, e.g. `"spf1"`.
    pub param: String,
    pub name: String,
    pub key: String,
    /// Case-insensitive substrings that mark a leaf text node as a value of this axis.
    pub keywords: Vec<String>,
}

impl AxisRule {
    /// Returns `true` if `text` contains any keyword, ignoring case.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .any(|kw| lower.contains(&kw.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackValue {
    pub value: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackAxis {
    pub name: String,
    pub key: String,
    pub param: String,
    pub values: Vec<FallbackValue>,
}

/// When discovery counts as insufficient, and what replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    #[serde(default = "default_min_axes")]
    pub min_axes: usize,
    #[serde(default = "default_min_total_values")]
    pub min_total_values: usize,
    pub axes: Vec<FallbackAxis>,
}

fn default_min_axes() -> usize {
    2
}

fn default_min_total_values() -> usize {
    4
}

impl FallbackPolicy {
    /// Describes why `discovered` is too thin to use, or `None` if it is sufficient.
    #[must_use]
    pub fn shortfall(&self, discovered: &[OptionAxis]) -> Option<String> {
        let axis_count = discovered.len();
        let value_count: usize = discovered.iter().map(|a| a.values.len()).sum();
        if axis_count < self.min_axes {
            return Some(format!(
                "discovered {axis_count} axes, need at least {}",
                self.min_axes
            ));
        }
        if value_count < self.min_total_values {
            return Some(format!(
                "discovered {value_count} values across axes, need at least {}",
                self.min_total_values
            ));
        }
        None
    }

    /// The predefined option table as domain axes, with `param` threaded into every value.
    #[must_use]
    pub fn table(&self) -> Vec<OptionAxis> {
        self.axes
            .iter()
            .map(|fa| {
                let mut axis = OptionAxis::new(&fa.name, &fa.key, &fa.param);
                for v in &fa.values {
                    axis.push_value(&v.value, &v.id);
                }
                axis
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsTable {
    pub rules: Vec<AxisRule>,
    pub fallback: FallbackPolicy,
}

fn rule(param: &str, name: &str, key: &str, keywords: &[&str]) -> AxisRule {
    AxisRule {
        param: param.to_string(),
        name: name.to_string(),
        key: key.to_string(),
        keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
    }
}

fn fallback_axis(name: &str, key: &str, param: &str, values: &[(&str, &str)]) -> FallbackAxis {
    FallbackAxis {
        name: name.to_string(),
        key: key.to_string(),
        param: param.to_string(),
        values: values
            .iter()
            .map(|(value, id)| FallbackValue {
                value: (*value).to_string(),
                id: (*id).to_string(),
            })
            .collect(),
    }
}

impl OptionsTable {
    /// Built-in rules and fallback table for the reference business-card product.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                rule(
                    "spf0",
                    "Product Type",
                    "product_type",
                    &["Standard", "Die Cut", "Folded", "Business Cards"],
                ),
                rule(
                    "spf1",
                    "Shape",
                    "shape",
                    &["Rectangle", "Square", "Rounded", "Corners"],
                ),
                rule("spf2", "Size", "size", &["x", "in", "inch", "\"", "'"]),
                rule(
                    "spf3",
                    "Material",
                    "paper_stock",
                    &["pt", "lb", "Paper", "Cardstock", "Gloss", "Matte"],
                ),
            ],
            fallback: FallbackPolicy {
                min_axes: default_min_axes(),
                min_total_values: default_min_total_values(),
                axes: vec![
                    fallback_axis(
                        "Shape",
                        "shape",
                        "spf1",
                        &[("Rectangle", "1390"), ("Rectangle | Rounded Corners", "1399")],
                    ),
                    fallback_axis(
                        "Size",
                        "size",
                        "spf2",
                        &[("2 x 3.5 in", "1391"), ("2 x 2 in", "1406")],
                    ),
                    fallback_axis(
                        "Paper stock",
                        "paper_stock",
                        "spf3",
                        &[
                            ("14pt Cardstock Gloss", "1419"),
                            ("14pt Cardstock Matte", "1420"),
                            ("14pt Cardstock High Gloss (UV)", "1421"),
                        ],
                    ),
                ],
            },
        }
    }
}

/// Load and validate an options table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_options_table(path: &Path) -> Result<OptionsTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::OptionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_options_table(&content)
}

/// Returns the table at `path`, or the built-in table when no path is configured.
///
/// # Errors
///
/// Propagates any error from [`load_options_table`].
pub fn resolve_options_table(path: Option<&Path>) -> Result<OptionsTable, ConfigError> {
    match path {
        Some(p) => load_options_table(p),
        None => Ok(OptionsTable::builtin()),
    }
}

fn parse_options_table(content: &str) -> Result<OptionsTable, ConfigError> {
    let table: OptionsTable =
        serde_yaml::from_str(content).map_err(ConfigError::OptionsFileParse)?;
    validate_options(&table)?;
    Ok(table)
}

fn validate_options(table: &OptionsTable) -> Result<(), ConfigError> {
    let mut rule_keys = HashSet::new();
    let mut rule_params = HashSet::new();

    for r in &table.rules {
        if r.key.trim().is_empty() || r.param.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "rule '{}' must have a non-empty key and param",
                r.name
            )));
        }
        if !rule_keys.insert(r.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate rule key: '{}'",
                r.key
            )));
        }
        if !rule_params.insert(r.param.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate rule param: '{}'",
                r.param
            )));
        }
        if r.keywords.iter().all(|k| k.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "rule '{}' has no keywords",
                r.key
            )));
        }
    }

    let mut fallback_keys = HashSet::new();
    for axis in &table.fallback.axes {
        if !fallback_keys.insert(axis.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate fallback axis key: '{}'",
                axis.key
            )));
        }
        if axis.values.is_empty() {
            return Err(ConfigError::Validation(format!(
                "fallback axis '{}' has no values",
                axis.key
            )));
        }
        if let Some(bad) = axis.values.iter().find(|v| !is_numeric_id(&v.id)) {
            return Err(ConfigError::Validation(format!(
                "fallback axis '{}' value '{}' has non-numeric id '{}'",
                axis.key, bad.value, bad.id
            )));
        }
    }

    Ok(())
}

/// `true` for a non-empty string of ASCII digits.
#[must_use]
pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;
