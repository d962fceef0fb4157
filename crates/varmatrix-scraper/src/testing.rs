//! In-memory renderer for unit tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use scraper::Html;
use varmatrix_core::{AppConfig, Environment};

use crate::dom::parse_selector;
use crate::error::RenderError;
use crate::renderer::{Locator, Renderer, WaitMode};

/// Settings with every delay zeroed and a single base-load retry.
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "debug".to_string(),
        user_agent: "varmatrix-test/0.1".to_string(),
        headless: true,
        base_load_timeout_ms: 5_000,
        variant_timeout_ms: 5_000,
        base_load_max_retries: 1,
        retry_backoff_base_ms: 0,
        settle_delay_ms: 0,
        inter_navigation_delay_ms: 0,
        overlay_wait_ms: 0,
        overlay_click_timeout_ms: 0,
        max_combinations: 256,
        image_limit: 5,
        currency: "USD".to_string(),
        options_path: None,
    }
}

/// Serves canned pages by exact URL and records every interaction.
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    pages: HashMap<String, String>,
    timeouts: HashSet<String>,
    transient_failures: HashMap<String, u32>,
    clickable: HashSet<String>,
    broken_clicks: HashSet<String>,
    current: Option<String>,
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub closed: bool,
}

impl FakeRenderer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(&mut self, url: &str, html: &str) {
        self.pages.insert(url.to_string(), html.to_string());
    }

    /// Every navigation to `url` times out.
    pub(crate) fn timeout_on(&mut self, url: &str) {
        self.timeouts.insert(url.to_string());
    }

    /// The first `count` navigations to `url` fail with a transient error.
    pub(crate) fn fail_first(&mut self, url: &str, count: u32) {
        self.transient_failures.insert(url.to_string(), count);
    }

    pub(crate) fn clickable(&mut self, locator: &Locator) {
        self.clickable.insert(locator.to_string());
    }

    pub(crate) fn broken_click(&mut self, locator: &Locator) {
        self.broken_clicks.insert(locator.to_string());
    }
}

impl Renderer for FakeRenderer {
    async fn navigate(
        &mut self,
        url: &str,
        _wait: WaitMode,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        self.navigations.push(url.to_string());
        if self.closed {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "closed".to_string(),
            });
        }
        if self.timeouts.contains(url) {
            return Err(RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        if let Some(remaining) = self.transient_failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    reason: "connection reset".to_string(),
                });
            }
        }
        if !self.pages.contains_key(url) {
            return Err(RenderError::UnexpectedStatus {
                status: 404,
                url: url.to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError> {
        let parsed = parse_selector(selector)?;
        let html = self.page_source().await?;
        if Html::parse_document(&html).select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(RenderError::NotFound {
                selector: selector.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }

    async fn page_source(&self) -> Result<String, RenderError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or(RenderError::NoPage)
    }

    async fn locate_and_click(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<bool, RenderError> {
        let key = locator.to_string();
        if self.broken_clicks.contains(&key) {
            return Err(RenderError::InvalidSelector {
                selector: key,
                reason: "detached element".to_string(),
            });
        }
        if self.clickable.contains(&key) {
            self.clicks.push(key);
            return Ok(true);
        }
        Ok(false)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed = true;
        self.current = None;
        Ok(())
    }
}
