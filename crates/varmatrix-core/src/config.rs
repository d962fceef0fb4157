use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like UA sent by the HTTP renderer unless `VARMATRIX_USER_AGENT` is set.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("VARMATRIX_ENV", "development"))?;
    let log_level = or_default("VARMATRIX_LOG_LEVEL", "info");
    let user_agent = or_default("VARMATRIX_USER_AGENT", DEFAULT_USER_AGENT);
    let headless = parse_bool("VARMATRIX_HEADLESS", "true")?;

    let base_load_timeout_ms = parse_u64("VARMATRIX_BASE_LOAD_TIMEOUT_MS", "90000")?;
    let variant_timeout_ms = parse_u64("VARMATRIX_VARIANT_TIMEOUT_MS", "45000")?;
    let base_load_max_retries = parse_u32("VARMATRIX_BASE_LOAD_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("VARMATRIX_RETRY_BACKOFF_BASE_MS", "2000")?;
    let settle_delay_ms = parse_u64("VARMATRIX_SETTLE_DELAY_MS", "2000")?;
    let inter_navigation_delay_ms = parse_u64("VARMATRIX_INTER_NAVIGATION_DELAY_MS", "500")?;
    let overlay_wait_ms = parse_u64("VARMATRIX_OVERLAY_WAIT_MS", "2000")?;
    let overlay_click_timeout_ms = parse_u64("VARMATRIX_OVERLAY_CLICK_TIMEOUT_MS", "1000")?;

    let max_combinations = parse_usize("VARMATRIX_MAX_COMBINATIONS", "256")?;
    if max_combinations == 0 {
        return Err(invalid(
            "VARMATRIX_MAX_COMBINATIONS",
            "must be at least 1".to_string(),
        ));
    }
    let image_limit = parse_usize("VARMATRIX_IMAGE_LIMIT", "5")?;
    let currency = or_default("VARMATRIX_CURRENCY", "USD").to_ascii_uppercase();
    let options_path = lookup("VARMATRIX_OPTIONS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        user_agent,
        headless,
        base_load_timeout_ms,
        variant_timeout_ms,
        base_load_max_retries,
        retry_backoff_base_ms,
        settle_delay_ms,
        inter_navigation_delay_ms,
        overlay_wait_ms,
        overlay_click_timeout_ms,
        max_combinations,
        image_limit,
        currency,
        options_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VARMATRIX_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
