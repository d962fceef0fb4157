//! Product identity from the unmodified base page.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;
use varmatrix_core::ProductMetadata;

use crate::dom::{element_text, rendered_text};
use crate::requote::QueryParams;

/// Images with an explicit width at or below this are icons, not product shots.
const MIN_IMAGE_WIDTH: u32 = 50;
const DEFAULT_UOM: &str = "unit";

static UOM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*(cards?|units?|pieces?)\b").expect("valid regex")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, .product-title, .page-title").expect("valid selector")
});
static SUBTITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".product-subtitle, .subtitle").expect("valid selector")
});
static META_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("valid selector")
});
static DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".product-description").expect("valid selector")
});
static IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#".product-image img, .gallery img, [class*="product"] img"#)
        .expect("valid selector")
});

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn description(doc: &Html) -> Option<String> {
    doc.select(&META_DESCRIPTION_SELECTOR)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
        .or_else(|| first_text(doc, &DESCRIPTION_SELECTOR))
}

fn is_thumbnail(img: ElementRef<'_>) -> bool {
    img.value()
        .attr("width")
        .and_then(|w| w.trim().trim_end_matches("px").parse::<u32>().ok())
        .is_some_and(|w| w <= MIN_IMAGE_WIDTH)
}

/// Product image URLs in page order, resolved against `page_url`,
/// deduplicated and capped at `limit`.
#[must_use]
pub fn image_urls(doc: &Html, page_url: &Url, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.select(&IMAGE_SELECTOR)
        .filter(|img| !is_thumbnail(*img))
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .filter_map(|src| page_url.join(src).ok())
        .map(String::from)
        .filter(|url| seen.insert(url.clone()))
        .take(limit)
        .collect()
}

/// Singular, lowercased unit from the first `<n> cards|units|pieces`
/// mention in the page text, `"unit"` when there is none.
#[must_use]
pub fn base_uom(text: &str) -> String {
    UOM_RE
        .captures(text)
        .map(|caps| {
            let unit = caps[1].to_lowercase();
            unit.strip_suffix('s').map(str::to_string).unwrap_or(unit)
        })
        .unwrap_or_else(|| DEFAULT_UOM.to_string())
}

/// Reads product identity from the base page.
///
/// Identifiers come from the `id` and `productGroupId` query parameters;
/// everything else is read from the markup and left empty when missing.
#[must_use]
pub fn extract_metadata(
    html: &str,
    page_url: &Url,
    params: &QueryParams,
    currency: &str,
    image_limit: usize,
) -> ProductMetadata {
    let doc = Html::parse_document(html);
    ProductMetadata {
        id: params.get("id").map(str::to_string),
        product_group_id: params.get("productGroupId").map(str::to_string),
        title: first_text(&doc, &TITLE_SELECTOR),
        subtitle: first_text(&doc, &SUBTITLE_SELECTOR),
        description: description(&doc),
        currency: currency.to_string(),
        image_urls: image_urls(&doc, page_url, image_limit),
        base_uom: base_uom(&rendered_text(&doc)),
    }
}
