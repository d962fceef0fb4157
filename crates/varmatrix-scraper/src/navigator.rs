//! Drives the renderer to one variant's requoted URL.

use std::time::Duration;

use varmatrix_core::{AppConfig, Selection};

use crate::overlay::OverlayDismisser;
use crate::renderer::{Renderer, WaitMode};
use crate::requote::ProductUrl;

/// Container that signals pricing content has rendered.
pub const PRICING_CONTAINER: &str = r#"table, [class*="price"]"#;

/// Waits used around every navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTimings {
    pub variant_timeout: Duration,
    pub settle_delay: Duration,
    pub content_wait: Duration,
    pub pacing: Duration,
}

impl NavigationTimings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let settle_delay = Duration::from_millis(config.settle_delay_ms);
        Self {
            variant_timeout: Duration::from_millis(config.variant_timeout_ms),
            settle_delay,
            content_wait: settle_delay,
            pacing: Duration::from_millis(config.inter_navigation_delay_ms),
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Visits selections one at a time, leaving the renderer on the variant page.
#[derive(Debug, Clone)]
pub struct VariantNavigator {
    timings: NavigationTimings,
    dismisser: OverlayDismisser,
}

impl VariantNavigator {
    #[must_use]
    pub fn new(timings: NavigationTimings, dismisser: OverlayDismisser) -> Self {
        Self { timings, dismisser }
    }

    /// Navigates to the requoted URL for `selection` and clears overlays.
    ///
    /// Returns the visited URL, or `None` when the navigation failed; the
    /// failure is logged and the caller moves on to the next selection.
    pub async fn visit<R: Renderer>(
        &self,
        renderer: &mut R,
        product: &ProductUrl,
        selection: &Selection,
    ) -> Option<String> {
        let url = product.requote(selection);

        if let Err(e) = renderer
            .navigate(&url, WaitMode::DomContentLoaded, self.timings.variant_timeout)
            .await
        {
            tracing::warn!(
                url = %url,
                selection = %selection.describe(),
                error = %e,
                "variant navigation failed; skipping"
            );
            return None;
        }

        pause(self.timings.settle_delay).await;
        if let Err(e) = renderer
            .wait_for(PRICING_CONTAINER, self.timings.content_wait)
            .await
        {
            tracing::debug!(url = %url, error = %e, "pricing container not found");
        }
        self.dismisser.dismiss_all(renderer).await;
        pause(self.timings.settle_delay).await;

        Some(url)
    }

    /// Fixed delay between consecutive navigations.
    pub async fn pace(&self) {
        pause(self.timings.pacing).await;
    }
}
