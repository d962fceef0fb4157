pub mod discovery;
pub mod dom;
pub mod enumerate;
pub mod error;
pub mod matrix;
pub mod metadata;
pub mod navigator;
pub mod overlay;
pub mod pricing;
pub mod renderer;
pub mod requote;
mod retry;

#[cfg(test)]
mod testing;

pub use discovery::{classify_leaf, discover_options, Discovery, DiscoverySource};
pub use enumerate::{combination_count, enumerate_selections, Selections};
pub use error::{RenderError, ScraperError};
pub use matrix::MatrixScraper;
pub use metadata::extract_metadata;
pub use navigator::{NavigationTimings, VariantNavigator};
pub use overlay::{DismissOutcome, DismissReport, OverlayDismisser};
pub use pricing::{build_tiers, extract_pricing, PriceCandidate};
pub use renderer::{HttpRenderer, Locator, Renderer, WaitMode};
pub use requote::{ProductUrl, QueryParams};
