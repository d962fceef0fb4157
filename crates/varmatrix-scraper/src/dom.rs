//! Small DOM helpers shared by the extractors.
//!
//! Extractors receive page markup from the renderer and query it through
//! `scraper`; these helpers give them `innerText`-like text and the
//! identifier chain used by option discovery.

use scraper::{ElementRef, Html, Selector};

use crate::error::RenderError;

/// Elements whose text never renders.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Identifier-bearing attributes of one element, in lookup priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeIdentity {
    pub data_id: Option<String>,
    pub data_value: Option<String>,
    pub id: Option<String>,
}

impl NodeIdentity {
    /// The element's identifier: first non-empty of `data-id`, `data-value`, `id`.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        [&self.data_id, &self.data_value, &self.id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }

    fn of(el: ElementRef<'_>) -> Self {
        let attr = |name: &str| el.value().attr(name).map(str::to_string);
        Self {
            data_id: attr("data-id"),
            data_value: attr("data-value"),
            id: attr("id"),
        }
    }
}

/// A childless element with its trimmed text and the identities of the
/// element itself followed by its nearest ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub text: String,
    pub chain: Vec<NodeIdentity>,
}

/// Parses a selector, mapping failures into [`RenderError::InvalidSelector`].
///
/// # Errors
///
/// Returns [`RenderError::InvalidSelector`] when `selector` is not valid CSS.
pub fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|e| RenderError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text of `el` with each text node trimmed, joined by single spaces.
#[must_use]
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_rendered(el: ElementRef<'_>) -> bool {
    !el.ancestors()
        .filter_map(ElementRef::wrap)
        .chain(std::iter::once(el))
        .any(|e| NON_RENDERED_TAGS.contains(&e.value().name()))
}

/// All rendered elements without child elements, with a `depth`-long identity chain.
#[must_use]
pub fn leaf_nodes(doc: &Html, depth: usize) -> Vec<LeafNode> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.children().all(|c| !c.value().is_element()))
        .filter(|el| is_rendered(*el))
        .map(|el| {
            let chain = std::iter::once(el)
                .chain(el.ancestors().filter_map(ElementRef::wrap))
                .take(depth)
                .map(NodeIdentity::of)
                .collect();
            LeafNode {
                text: element_text(el),
                chain,
            }
        })
        .collect()
}

/// All text of the document outside non-rendered elements, whitespace-collapsed.
#[must_use]
pub fn rendered_text(doc: &Html) -> String {
    doc.root_element()
        .descendants()
        .filter(|node| {
            node.value().is_text()
                && !node
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|e| NON_RENDERED_TAGS.contains(&e.value().name()))
        })
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` if any rendered element's whole text equals `target` after
/// whitespace normalization.
#[must_use]
pub fn has_element_with_text(doc: &Html, target: &str) -> bool {
    let wanted = target.split_whitespace().collect::<Vec<_>>().join(" ");
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| is_rendered(*el))
        .any(|el| element_text(el) == wanted)
}
