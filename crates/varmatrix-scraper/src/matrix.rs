//! Orchestrates one product scrape from base page to [`MatrixRecord`].

use std::time::Duration;

use chrono::Utc;
use varmatrix_core::{AppConfig, MatrixRecord, OptionsTable, Selection, Variant};

use crate::discovery::discover_options;
use crate::enumerate::{combination_count, enumerate_selections};
use crate::error::ScraperError;
use crate::metadata::extract_metadata;
use crate::navigator::{NavigationTimings, VariantNavigator};
use crate::overlay::OverlayDismisser;
use crate::pricing::extract_pricing;
use crate::renderer::{Renderer, WaitMode};
use crate::requote::ProductUrl;
use crate::retry::Backoff;

/// A scrape session that owns one renderer for one product.
///
/// [`MatrixScraper::scrape`] closes the renderer on every exit path.
pub struct MatrixScraper<R: Renderer> {
    renderer: R,
    config: AppConfig,
    options: OptionsTable,
    dismisser: OverlayDismisser,
    navigator: VariantNavigator,
}

impl<R: Renderer> MatrixScraper<R> {
    #[must_use]
    pub fn new(renderer: R, config: AppConfig, options: OptionsTable) -> Self {
        let dismisser = OverlayDismisser::from_config(&config);
        let navigator =
            VariantNavigator::new(NavigationTimings::from_config(&config), dismisser.clone());
        Self {
            renderer,
            config,
            options,
            dismisser,
            navigator,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Scrapes `url` into a record and releases the renderer session.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidProductUrl`] if `url` is not an absolute
    ///   http(s) URL.
    /// - [`ScraperError::FatalLoad`] if the base page never loads within the
    ///   configured retries.
    /// - [`ScraperError::Render`] if the renderer cannot return the loaded
    ///   base page.
    pub async fn scrape(&mut self, url: &str) -> Result<MatrixRecord, ScraperError> {
        let result = self.run(url).await;
        if let Err(e) = self.renderer.close().await {
            tracing::warn!(error = %e, "failed to close renderer session");
        }
        result
    }

    async fn run(&mut self, url: &str) -> Result<MatrixRecord, ScraperError> {
        let product = ProductUrl::parse(url)?;

        tracing::info!(url = product.as_str(), "loading base page");
        self.load_base(&product).await?;
        self.settle().await;
        self.dismisser.dismiss_all(&mut self.renderer).await;
        let base_html = self.renderer.page_source().await?;

        let metadata = extract_metadata(
            &base_html,
            product.base(),
            product.params(),
            &self.config.currency,
            self.config.image_limit,
        );
        let discovery = discover_options(&base_html, &self.options);
        for axis in &discovery.axes {
            tracing::info!(axis = %axis.name, values = axis.values.len(), "option axis");
        }

        let cap = self.config.max_combinations;
        let total = combination_count(&discovery.axes);
        if total.is_none_or(|n| n > cap) {
            tracing::warn!(
                combinations = ?total,
                max_combinations = cap,
                "selection space exceeds limit; truncating in enumeration order"
            );
        }
        let planned = total.map_or(cap, |n| n.min(cap));

        let mut variants = Vec::new();
        for (index, selection) in enumerate_selections(&discovery.axes).take(cap).enumerate() {
            tracing::info!(
                variant = index + 1,
                of = planned,
                selection = %selection.describe(),
                "scraping variant"
            );
            if let Some(variant) = self.price_selection(&product, selection).await {
                variants.push(variant);
            }
            self.navigator.pace().await;
        }

        if variants.is_empty() {
            let pricing = extract_pricing(&base_html, &self.config.currency);
            if pricing.is_empty() {
                tracing::warn!(url = product.as_str(), "no pricing found on base page");
            } else {
                tracing::info!(tiers = pricing.len(), "priced base configuration");
                variants.push(Variant::priced(Selection::new(), pricing));
            }
        }

        let used_fallback = discovery.used_fallback();
        let record = MatrixRecord {
            source_url: product.as_str().to_string(),
            scraped_at: Utc::now(),
            product: metadata,
            options: discovery.axes,
            variants,
        };

        tracing::info!(
            title = record.product.title.as_deref().unwrap_or("unknown"),
            axes = record.options.len(),
            variants = record.variants.len(),
            priced = record.priced_variant_count(),
            used_fallback,
            "matrix scrape complete"
        );
        Ok(record)
    }

    async fn load_base(&mut self, product: &ProductUrl) -> Result<(), ScraperError> {
        let timeout = Duration::from_millis(self.config.base_load_timeout_ms);
        let mut backoff = Backoff::new(
            self.config.base_load_max_retries,
            self.config.retry_backoff_base_ms,
        );
        loop {
            match self
                .renderer
                .navigate(product.as_str(), WaitMode::DomContentLoaded, timeout)
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) if backoff.should_retry(&err).await => continue,
                Err(err) => {
                    tracing::error!(
                        url = product.as_str(),
                        attempts = backoff.attempts(),
                        error = %err,
                        "base page failed to load"
                    );
                    return Err(ScraperError::FatalLoad {
                        url: product.as_str().to_string(),
                        attempts: backoff.attempts(),
                        source: err,
                    });
                }
            }
        }
    }

    async fn settle(&self) {
        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }
    }

    /// Navigates to one selection and reads its tiers; `None` when the
    /// variant could not be loaded.
    async fn price_selection(
        &mut self,
        product: &ProductUrl,
        selection: Selection,
    ) -> Option<Variant> {
        let url = self
            .navigator
            .visit(&mut self.renderer, product, &selection)
            .await?;

        let html = match self.renderer.page_source().await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "variant page unreadable; skipping");
                return None;
            }
        };

        let pricing = extract_pricing(&html, &self.config.currency);
        if pricing.is_empty() {
            tracing::warn!(url = %url, "no pricing found for variant");
        } else {
            tracing::debug!(url = %url, tiers = pricing.len(), "variant priced");
        }
        Some(Variant::priced(selection, pricing))
    }
}

#[cfg(test)]
#[path = "matrix_test.rs"]
mod tests;
