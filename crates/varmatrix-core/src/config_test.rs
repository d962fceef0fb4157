use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("unknown").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "VARMATRIX_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert!(cfg.headless);
    assert_eq!(cfg.base_load_timeout_ms, 90_000);
    assert_eq!(cfg.variant_timeout_ms, 45_000);
    assert_eq!(cfg.base_load_max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 2_000);
    assert_eq!(cfg.settle_delay_ms, 2_000);
    assert_eq!(cfg.inter_navigation_delay_ms, 500);
    assert_eq!(cfg.overlay_wait_ms, 2_000);
    assert_eq!(cfg.overlay_click_timeout_ms, 1_000);
    assert_eq!(cfg.max_combinations, 256);
    assert_eq!(cfg.image_limit, 5);
    assert_eq!(cfg.currency, "USD");
    assert!(cfg.options_path.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_ENV", "production");
    map.insert("VARMATRIX_HEADLESS", "false");
    map.insert("VARMATRIX_SETTLE_DELAY_MS", "0");
    map.insert("VARMATRIX_MAX_COMBINATIONS", "12");
    map.insert("VARMATRIX_CURRENCY", "eur");
    map.insert("VARMATRIX_OPTIONS_PATH", "./config/options.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert!(!cfg.headless);
    assert_eq!(cfg.settle_delay_ms, 0);
    assert_eq!(cfg.max_combinations, 12);
    assert_eq!(cfg.currency, "EUR");
    assert_eq!(
        cfg.options_path.as_deref(),
        Some(std::path::Path::new("./config/options.yaml"))
    );
}

#[test]
fn build_app_config_ignores_blank_options_path() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_OPTIONS_PATH", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.options_path.is_none());
}

#[test]
fn build_app_config_fails_with_invalid_environment() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_ENV", "staging");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARMATRIX_ENV"),
        "expected InvalidEnvVar(VARMATRIX_ENV), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_variant_timeout() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_VARIANT_TIMEOUT_MS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARMATRIX_VARIANT_TIMEOUT_MS"),
        "expected InvalidEnvVar(VARMATRIX_VARIANT_TIMEOUT_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_max_retries() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_BASE_LOAD_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARMATRIX_BASE_LOAD_MAX_RETRIES"),
        "expected InvalidEnvVar(VARMATRIX_BASE_LOAD_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_max_combinations() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_MAX_COMBINATIONS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARMATRIX_MAX_COMBINATIONS"),
        "expected InvalidEnvVar(VARMATRIX_MAX_COMBINATIONS), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_headless_flag() {
    let mut map = HashMap::new();
    map.insert("VARMATRIX_HEADLESS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARMATRIX_HEADLESS"),
        "expected InvalidEnvVar(VARMATRIX_HEADLESS), got: {result:?}"
    );
}
