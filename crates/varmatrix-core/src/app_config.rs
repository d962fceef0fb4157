use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for one matrix scrape.
///
/// Every field has a default; see [`crate::config::load_app_config`] for the
/// environment variables that override them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub user_agent: String,
    /// Requested browser visibility. The HTTP renderer is always headless.
    pub headless: bool,
    pub base_load_timeout_ms: u64,
    pub variant_timeout_ms: u64,
    /// Additional attempts after the first failed base-page load.
    pub base_load_max_retries: u32,
    /// Base delay for exponential backoff: `retry_backoff_base_ms * 2^attempt`.
    pub retry_backoff_base_ms: u64,
    pub settle_delay_ms: u64,
    /// Fixed pause after every variant navigation.
    pub inter_navigation_delay_ms: u64,
    pub overlay_wait_ms: u64,
    pub overlay_click_timeout_ms: u64,
    /// Upper bound on selections navigated per product.
    pub max_combinations: usize,
    pub image_limit: usize,
    pub currency: String,
    /// Options YAML overriding the built-in keyword rules and fallback table.
    pub options_path: Option<PathBuf>,
}
