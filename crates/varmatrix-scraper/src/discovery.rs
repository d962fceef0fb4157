//! Option-axis inference from leaf text nodes.
//!
//! Discovery is a rule-based classifier: each [`AxisRule`] names a query
//! parameter and the keywords that mark its values. A leaf element whose
//! text matches a rule becomes a value once an ancestor within reach
//! exposes a purely numeric identifier. When the result is too thin the
//! whole discovery is replaced by the configured fallback table.

use scraper::Html;
use varmatrix_core::{is_numeric_id, AxisRule, OptionAxis, OptionValue, OptionsTable};

use crate::dom::{leaf_nodes, NodeIdentity};

/// Levels inspected for an identifier: the leaf itself plus two ancestors.
pub const ANCESTOR_DEPTH: usize = 3;

const MIN_TEXT_CHARS: usize = 2;
const MAX_TEXT_CHARS: usize = 100;

/// Where the axes of a [`Discovery`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverySource {
    Inferred,
    /// Inference was insufficient; `reason` says why.
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub axes: Vec<OptionAxis>,
    pub source: DiscoverySource,
}

impl Discovery {
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        matches!(self.source, DiscoverySource::Fallback { .. })
    }
}

/// Classifies one leaf for one rule.
///
/// `chain` holds the identities of the leaf followed by its ancestors,
/// nearest first. Only the first [`ANCESTOR_DEPTH`] levels are inspected;
/// a level with a non-numeric identifier is skipped, so the first numeric
/// one anchors the value.
#[must_use]
pub fn classify_leaf(text: &str, chain: &[NodeIdentity], rule: &AxisRule) -> Option<OptionValue> {
    let text = text.trim();
    let len = text.chars().count();
    if len <= MIN_TEXT_CHARS || len >= MAX_TEXT_CHARS || !rule.matches(text) {
        return None;
    }

    chain
        .iter()
        .take(ANCESTOR_DEPTH)
        .filter_map(NodeIdentity::identifier)
        .find(|id| is_numeric_id(id))
        .map(|id| OptionValue::new(text, id, &rule.param))
}

/// Runs every rule over the leaves of `doc`, keeping axes that found values.
#[must_use]
pub fn infer_axes(doc: &Html, rules: &[AxisRule]) -> Vec<OptionAxis> {
    let leaves = leaf_nodes(doc, ANCESTOR_DEPTH);

    rules
        .iter()
        .filter_map(|rule| {
            let mut axis = OptionAxis::new(&rule.name, &rule.key, &rule.param);
            for leaf in &leaves {
                if let Some(value) = classify_leaf(&leaf.text, &leaf.chain, rule) {
                    axis.push_value(value.value, value.id);
                }
            }
            (!axis.values.is_empty()).then_some(axis)
        })
        .collect()
}

/// Infers option axes from page markup, falling back to the predefined
/// table when the options table's policy deems the result insufficient.
#[must_use]
pub fn discover_options(html: &str, options: &OptionsTable) -> Discovery {
    let doc = Html::parse_document(html);
    let axes = infer_axes(&doc, &options.rules);

    match options.fallback.shortfall(&axes) {
        None => {
            tracing::debug!(axes = axes.len(), "inferred option axes from markup");
            Discovery {
                axes,
                source: DiscoverySource::Inferred,
            }
        }
        Some(reason) => {
            tracing::warn!(
                discovered_axes = axes.len(),
                reason = %reason,
                "option discovery insufficient; using fallback option table"
            );
            Discovery {
                axes: options.fallback.table(),
                source: DiscoverySource::Fallback { reason },
            }
        }
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
