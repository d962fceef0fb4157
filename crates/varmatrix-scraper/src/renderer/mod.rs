//! The page-rendering capability the matrix engine drives.
//!
//! The engine never touches a browser or HTTP client directly: every
//! navigation, wait, DOM query and click goes through a [`Renderer`] handle
//! owned by the scrape session. [`HttpRenderer`] is the bundled
//! implementation (plain HTTP fetch + HTML parsing).

mod http;

use std::time::Duration;

use crate::error::RenderError;

pub use http::HttpRenderer;

/// How long `navigate` waits before treating the page as loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    DomContentLoaded,
    Load,
    NetworkIdle,
}

/// Target of a click action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A CSS selector; the first match is clicked.
    Css(String),
    /// An element whose whitespace-normalized text equals this string exactly.
    Text(String),
}

impl Locator {
    #[must_use]
    pub fn css(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }

    #[must_use]
    pub fn text(text: &str) -> Self {
        Locator::Text(text.to_string())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "{selector}"),
            Locator::Text(text) => write!(f, "text=\"{text}\""),
        }
    }
}

/// A single rendering session: one page, one navigation in flight.
///
/// Callers own the session for exactly one scrape and must call
/// [`Renderer::close`] when done.
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// Loads `url` and replaces the current page.
    ///
    /// # Errors
    ///
    /// [`RenderError::Timeout`] when the page does not load within `timeout`;
    /// [`RenderError::BotChallenge`] when the response is an anti-bot page;
    /// [`RenderError::Navigation`], [`RenderError::Http`] or
    /// [`RenderError::UnexpectedStatus`] on other load failures.
    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitMode,
        timeout: Duration,
    ) -> Result<(), RenderError>;

    /// Waits until `selector` matches an element on the current page.
    ///
    /// # Errors
    ///
    /// [`RenderError::NotFound`] if nothing matches within `timeout`. Callers
    /// treat this as best-effort.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Returns the rendered markup of the current page for bulk DOM queries.
    ///
    /// # Errors
    ///
    /// [`RenderError::NoPage`] before the first successful navigation.
    async fn page_source(&self) -> Result<String, RenderError>;

    /// Clicks the element addressed by `locator`.
    ///
    /// Returns `Ok(false)` when the element is not visible within `timeout`.
    ///
    /// # Errors
    ///
    /// Only for failures unrelated to visibility, e.g. an unparsable selector.
    async fn locate_and_click(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, RenderError>;

    /// Releases the session. Further navigation fails.
    ///
    /// # Errors
    ///
    /// Implementation-specific teardown failures.
    async fn close(&mut self) -> Result<(), RenderError>;
}
