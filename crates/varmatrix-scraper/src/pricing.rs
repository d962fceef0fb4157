//! Tolerant price-tier extraction from rendered product pages.
//!
//! Three independent passes feed one candidate list: row text, adjacent
//! table-cell pairs, and a single "current price" element. Candidates are
//! bounded, deduplicated by quantity (first wins) and sorted.
//!
//! The current price must be an element outside any tier markup whose whole
//! text is one amount. Price tables and notes like "Prices from $9.99" never
//! produce one.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use varmatrix_core::{Money, PriceTier};

use crate::dom::element_text;

/// Smallest quantity accepted as a tier.
pub const MIN_QUANTITY: u32 = 50;
/// Quantities at or above this are treated as noise (SKUs, phone numbers).
pub const MAX_QUANTITY_EXCLUSIVE: u32 = 100_000;
/// Decimal places of a derived unit price.
pub const UNIT_PRICE_SCALE: u32 = 4;

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?(\d[\d,]*(?:\.\d+)?)").expect("valid regex"));
static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+|\d{2,}").expect("valid regex"));
static AMOUNT_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\s?\d[\d,]*(?:\.\d+)?$").expect("valid regex"));

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"tr, .pricing-row, .quantity-row, [class*="price-row"]"#)
        .expect("valid selector")
});
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid selector"));
/// Anything the tier passes already read; never a current-price element.
static TIER_MARKUP: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"table, tr, td, .pricing-row, .quantity-row, [class*="price-row"]"#)
        .expect("valid selector")
});
static CURRENT_PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [".current-price", ".product-price", r#"[class*="price"]"#]
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

/// A raw `(quantity, total)` pair before bounding and deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceCandidate {
    /// `None` for the current-configuration price.
    pub quantity: Option<u32>,
    pub total: Decimal,
}

impl PriceCandidate {
    #[must_use]
    pub fn tier(quantity: u32, total: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            total,
        }
    }

    fn admissible(&self) -> bool {
        if self.total <= Decimal::ZERO {
            return false;
        }
        self.quantity
            .is_none_or(|q| (MIN_QUANTITY..MAX_QUANTITY_EXCLUSIVE).contains(&q))
    }
}

/// First `$` amount in `text`, commas removed.
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let caps = CURRENCY_RE.captures(text)?;
    let digits = caps[1].replace(',', "");
    Decimal::from_str(digits.trim_end_matches('.')).ok()
}

/// First quantity-like integer in `text` once currency amounts are removed.
#[must_use]
pub fn parse_quantity(text: &str) -> Option<u32> {
    let without_prices = CURRENCY_RE.replace_all(text, " ");
    let found = QUANTITY_RE.find(&without_prices)?;
    found.as_str().replace(',', "").parse().ok()
}

fn row_candidates(doc: &Html) -> Vec<PriceCandidate> {
    doc.select(&ROW_SELECTOR)
        .filter_map(|row| {
            let text = element_text(row);
            let total = parse_amount(&text)?;
            let quantity = parse_quantity(&text)?;
            Some(PriceCandidate::tier(quantity, total))
        })
        .collect()
}

fn cell_candidates(doc: &Html) -> Vec<PriceCandidate> {
    let mut out = Vec::new();
    for table in doc.select(&TABLE_SELECTOR) {
        let cells: Vec<String> = table.select(&CELL_SELECTOR).map(element_text).collect();
        for pair in cells.windows(2) {
            if let (Some(quantity), Some(total)) = (parse_quantity(&pair[0]), parse_amount(&pair[1])) {
                out.push(PriceCandidate::tier(quantity, total));
            }
        }
    }
    out
}

fn is_tier_markup(el: ElementRef<'_>) -> bool {
    TIER_MARKUP.matches(&el)
        || el.select(&TIER_MARKUP).next().is_some()
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| TIER_MARKUP.matches(&ancestor))
}

/// The element's text when it is a bare amount such as `$42.00`.
fn standalone_amount(el: ElementRef<'_>) -> Option<Decimal> {
    if is_tier_markup(el) {
        return None;
    }
    let text = element_text(el);
    if !AMOUNT_ONLY_RE.is_match(&text) {
        return None;
    }
    parse_amount(&text)
}

fn current_price(doc: &Html) -> Option<PriceCandidate> {
    CURRENT_PRICE_SELECTORS.iter().find_map(|selector| {
        doc.select(selector)
            .find_map(standalone_amount)
            .map(|total| PriceCandidate {
                quantity: None,
                total,
            })
    })
}

/// Every raw candidate on the page, row pass first, then cell pairs, then
/// the current price.
#[must_use]
pub fn collect_candidates(doc: &Html) -> Vec<PriceCandidate> {
    let mut candidates = row_candidates(doc);
    candidates.extend(cell_candidates(doc));
    candidates.extend(current_price(doc));
    candidates
}

/// `total / quantity` at [`UNIT_PRICE_SCALE`] places, banker's rounding.
#[must_use]
pub fn unit_price(total: Decimal, quantity: u32) -> Option<Decimal> {
    let mut unit = total.checked_div(Decimal::from(quantity))?.round_dp(UNIT_PRICE_SCALE);
    unit.rescale(UNIT_PRICE_SCALE);
    Some(unit)
}

/// Bounds, deduplicates and sorts candidates into tiers.
///
/// The first candidate for a quantity wins, and at most one quantity-less
/// record is kept. The sort puts the quantity-less record first.
#[must_use]
pub fn build_tiers(candidates: &[PriceCandidate], currency: &str) -> Vec<PriceTier> {
    let money = |amount: Decimal| Money {
        amount,
        currency: currency.to_string(),
    };

    let mut seen = HashSet::new();
    let mut tiers: Vec<PriceTier> = candidates
        .iter()
        .filter(|c| c.admissible())
        .filter(|c| seen.insert(c.quantity))
        .map(|c| PriceTier {
            quantity: c.quantity,
            unit_price: c
                .quantity
                .and_then(|q| unit_price(c.total, q))
                .map(money),
            total_price: money(c.total),
        })
        .collect();

    tiers.sort_by_key(|t| t.quantity);
    tiers
}

/// Extracts the tier list from rendered page markup.
#[must_use]
pub fn extract_pricing(html: &str, currency: &str) -> Vec<PriceTier> {
    let doc = Html::parse_document(html);
    build_tiers(&collect_candidates(&doc), currency)
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
