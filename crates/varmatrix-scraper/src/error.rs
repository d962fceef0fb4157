use thiserror::Error;

/// Failures reported by a [`crate::Renderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("{url} answered with a bot challenge ({marker}, HTTP {status})")]
    BotChallenge {
        url: String,
        status: u16,
        marker: &'static str,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("no element matched {selector} within {timeout_ms}ms")]
    NotFound { selector: String, timeout_ms: u64 },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no page has been loaded yet")]
    NoPage,
}

impl RenderError {
    /// `true` for failures worth retrying: network errors, timeouts, 429/5xx
    /// responses and bot-challenge pages.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            RenderError::Http(_)
            | RenderError::Navigation { .. }
            | RenderError::Timeout { .. }
            | RenderError::BotChallenge { .. } => true,
            RenderError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            RenderError::NotFound { .. }
            | RenderError::InvalidSelector { .. }
            | RenderError::NoPage => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("invalid product URL \"{url}\": {reason}")]
    InvalidProductUrl { url: String, reason: String },

    #[error("base page {url} did not load after {attempts} attempts: {source}")]
    FatalLoad {
        url: String,
        attempts: u32,
        #[source]
        source: RenderError,
    },
}
