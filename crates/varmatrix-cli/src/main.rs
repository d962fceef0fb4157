mod scrape;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use varmatrix_core::Environment;

/// Reference business-card product used when no `--url` is given.
const DEFAULT_PRODUCT_URL: &str = "https://us.bizay.com/en-us/business-cards-2?id=443495438&spf0=1411&spf1=1390&spf2=1391&spf3=1419&productGroupId=1386&indexManagementId=3";

#[derive(Debug, Parser)]
#[command(name = "varmatrix")]
#[command(about = "Discover, enumerate and price the variant matrix of a product page")]
struct Cli {
    /// Product page whose query string carries the option ids.
    #[arg(long, default_value = DEFAULT_PRODUCT_URL)]
    url: String,

    /// Where to write the JSON record.
    #[arg(long, default_value = "./matrix_output.json")]
    output: PathBuf,

    /// Run the renderer without a visible window (default).
    #[arg(long, overrides_with = "no_headless")]
    headless: bool,

    /// Request a visible browser window.
    #[arg(long = "no-headless", overrides_with = "headless")]
    no_headless: bool,

    /// Options YAML overriding the discovery rules and fallback table.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Upper bound on the number of variants navigated.
    #[arg(long)]
    max_combinations: Option<NonZeroUsize>,
}

impl Cli {
    /// Explicit visibility choice, if either flag was given.
    fn headless_override(&self) -> Option<bool> {
        if self.no_headless {
            Some(false)
        } else if self.headless {
            Some(true)
        } else {
            None
        }
    }

    /// Command-line flags take precedence over environment settings.
    fn apply(&self, config: &mut varmatrix_core::AppConfig) {
        if let Some(headless) = self.headless_override() {
            config.headless = headless;
        }
        if let Some(path) = &self.options {
            config.options_path = Some(path.clone());
        }
        if let Some(max) = self.max_combinations {
            config.max_combinations = max.get();
        }
    }
}

/// How log lines are rendered for a deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogFormat {
    ansi: bool,
    target: bool,
}

/// Production logs go to files and aggregators: no colour codes, and the
/// emitting module is kept. Development keeps colour and drops the target.
fn log_format(env: &Environment) -> LogFormat {
    match env {
        Environment::Production => LogFormat {
            ansi: false,
            target: true,
        },
        Environment::Development => LogFormat {
            ansi: true,
            target: false,
        },
        Environment::Test => LogFormat {
            ansi: false,
            target: false,
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = varmatrix_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    let format = log_format(&config.env);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(format.ansi)
        .with_target(format.target)
        .init();

    cli.apply(&mut config);
    tracing::debug!(env = %config.env, url = %cli.url, "configuration loaded");
    scrape::run_scrape(&cli.url, &cli.output, config).await
}
