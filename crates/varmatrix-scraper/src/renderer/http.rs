//! Static renderer: fetches markup over HTTP and queries it with `scraper`.
//!
//! There is no script execution, so content that only appears after client
//! side rendering is invisible here, and clicks cannot change the page. A
//! click on a matched element is reported as performed and the document is
//! left as fetched.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;

use super::{Locator, Renderer, WaitMode};
use crate::dom::{has_element_with_text, parse_selector};
use crate::error::RenderError;

/// [`Renderer`] backed by a `reqwest` client.
pub struct HttpRenderer {
    client: Client,
    page: Option<String>,
    closed: bool,
}

impl HttpRenderer {
    /// Creates a renderer that identifies itself with `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self, RenderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            page: None,
            closed: false,
        })
    }

    /// Creates a renderer from runtime settings.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`HttpRenderer::new`].
    pub fn from_config(config: &varmatrix_core::AppConfig) -> Result<Self, RenderError> {
        if !config.headless {
            tracing::warn!("HTTP renderer has no visible browser window; running headless");
        }
        Self::new(&config.user_agent)
    }

    fn document(&self) -> Result<Html, RenderError> {
        let html = self.page.as_deref().ok_or(RenderError::NoPage)?;
        Ok(Html::parse_document(html))
    }

    async fn fetch(&self, url: &str) -> Result<String, RenderError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Checked before the status so a 403 or 503 challenge stays retryable.
        if let Some(marker) = challenge_marker(&body) {
            return Err(RenderError::BotChallenge {
                url: url.to_owned(),
                status: status.as_u16(),
                marker,
            });
        }
        if !status.is_success() {
            return Err(RenderError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(body)
    }
}

impl Renderer for HttpRenderer {
    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitMode,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::Navigation {
                url: url.to_owned(),
                reason: "renderer session is closed".to_string(),
            });
        }

        // The whole document arrives in one response, so every wait mode is
        // satisfied once the body is read.
        tracing::debug!(url, ?wait, "fetching page");
        let html = tokio::time::timeout(timeout, self.fetch(url))
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_owned(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        self.page = Some(html);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError> {
        let parsed = parse_selector(selector)?;
        let doc = self.document()?;
        if doc.select(&parsed).next().is_some() {
            return Ok(());
        }
        // A static document never changes, so there is nothing to wait for.
        Err(RenderError::NotFound {
            selector: selector.to_owned(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    async fn page_source(&self) -> Result<String, RenderError> {
        self.page.clone().ok_or(RenderError::NoPage)
    }

    async fn locate_and_click(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<bool, RenderError> {
        let doc = self.document()?;
        let found = match locator {
            Locator::Css(selector) => {
                let parsed = parse_selector(selector)?;
                doc.select(&parsed).next().is_some()
            }
            Locator::Text(text) => has_element_with_text(&doc, text),
        };
        Ok(found)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.page = None;
        self.closed = true;
        Ok(())
    }
}

/// Marker groups that identify an anti-bot interstitial. A body is a
/// challenge when every marker of one group appears in it; the first marker
/// of the matching group names it in errors and logs.
const CHALLENGE_MARKERS: &[&[&str]] = &[
    &["/cdn-cgi/challenge-platform/"],
    &["attention required! | cloudflare"],
    &["just a moment...", "please enable cookies"],
    &["just a moment...", "cf-chl-"],
    &["px-captcha"],
    &["_incapsula_resource"],
    &["verify you are human", "captcha"],
];

fn challenge_marker(body: &str) -> Option<&'static str> {
    let lowered = body.to_ascii_lowercase();
    CHALLENGE_MARKERS
        .iter()
        .find(|group| group.iter().all(|marker| lowered.contains(marker)))
        .map(|group| group[0])
}
