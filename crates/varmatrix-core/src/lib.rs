pub mod app_config;
pub mod config;
pub mod matrix;
pub mod options;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use matrix::{
    MatrixRecord, Money, OptionAxis, OptionValue, PriceTier, ProductMetadata, SelectedOption,
    Selection, Variant,
};
pub use options::{
    is_numeric_id, load_options_table, resolve_options_table, AxisRule, FallbackAxis,
    FallbackPolicy, FallbackValue, OptionsTable,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read options file {path}: {source}")]
    OptionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse options file: {0}")]
    OptionsFileParse(#[source] serde_yaml::Error),

    #[error("options validation failed: {0}")]
    Validation(String),
}
