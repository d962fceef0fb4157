//! Catalog record types produced by one variant-matrix scrape.
//!
//! Everything here is created by a single run and serialized once; nothing
//! is shared across products or runs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Product identity pulled from the unmodified base page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    /// Site product identifier, taken from the `id` query parameter.
    pub id: Option<String>,
    /// Taken from the `productGroupId` query parameter.
    pub product_group_id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// ISO 4217 currency code (e.g., `"USD"`).
    pub currency: String,
    /// Deduplicated, in page order, capped at the configured image limit.
    pub image_urls: Vec<String>,
    /// Singular, lowercased unit such as `"card"`; `"unit"` when none is found.
    pub base_uom: String,
}

/// One selectable value of an [`OptionAxis`].
///
/// `param` is threaded through for requoting and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionValue {
    pub value: String,
    /// Site-assigned identifier; always ASCII digits only.
    pub id: String,
    #[serde(skip)]
    pub param: String,
}

impl OptionValue {
    #[must_use]
    pub fn new(value: impl Into<String>, id: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            id: id.into(),
            param: param.into(),
        }
    }
}

/// A configurable dimension of a product, e.g. shape or paper stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAxis {
    pub name: String,
    /// Stable key used in selection maps; unique across one product's axes.
    pub key: String,
    /// Query parameter this axis controls, e.g. `"spf2"`.
    #[serde(skip)]
    pub param: String,
    pub values: Vec<OptionValue>,
}

impl OptionAxis {
    #[must_use]
    pub fn new(name: impl Into<String>, key: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            param: param.into(),
            values: Vec::new(),
        }
    }

    /// Appends a value unless the same `(value, id)` pair is already present.
    ///
    /// Returns `true` when the value was added.
    pub fn push_value(&mut self, value: impl Into<String>, id: impl Into<String>) -> bool {
        let value = value.into();
        let id = id.into();
        if self.values.iter().any(|v| v.value == value && v.id == id) {
            return false;
        }
        self.values.push(OptionValue {
            value,
            id,
            param: self.param.clone(),
        });
        true
    }
}

/// The value chosen for one axis inside a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedOption {
    pub key: String,
    pub value: OptionValue,
}

/// One point in the product configuration space: axis key → chosen value.
///
/// Entries keep axis order, and serialize as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<SelectedOption>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for `key`, replacing any earlier choice for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        let key = key.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == key) {
            existing.value = value;
        } else {
            self.entries.push(SelectedOption { key, value });
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedOption> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable `key=value` summary for progress logs.
    #[must_use]
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}={}", e.key, e.value.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a SelectedOption;
    type IntoIter = std::slice::Iter<'a, SelectedOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}

/// A decimal amount in a named currency. Amounts serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

/// A quantity breakpoint and its price.
///
/// `quantity` is `None` only for the single "current configuration" price
/// read from the page, which carries no unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub quantity: Option<u32>,
    pub unit_price: Option<Money>,
    pub total_price: Money,
}

/// A priced point in the configuration space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// Not recoverable from markup on the supported sites; always `None` today.
    pub sku: Option<String>,
    pub available: bool,
    pub selection: Selection,
    pub pricing: Vec<PriceTier>,
}

impl Variant {
    /// Builds a variant whose availability reflects whether any tier was found.
    #[must_use]
    pub fn priced(selection: Selection, pricing: Vec<PriceTier>) -> Self {
        Self {
            sku: None,
            available: !pricing.is_empty(),
            selection,
            pricing,
        }
    }
}

/// The full catalog record for one product page.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRecord {
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub product: ProductMetadata,
    pub options: Vec<OptionAxis>,
    pub variants: Vec<Variant>,
}

impl MatrixRecord {
    /// Number of variants with at least one extracted price tier.
    #[must_use]
    pub fn priced_variant_count(&self) -> usize {
        self.variants.iter().filter(|v| v.available).count()
    }
}
