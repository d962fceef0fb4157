//! The single `varmatrix` command: scrape one product and write its record.

use std::path::Path;

use anyhow::Context;
use varmatrix_core::{resolve_options_table, AppConfig, MatrixRecord};
use varmatrix_scraper::{HttpRenderer, MatrixScraper};

/// Scrapes `url` and writes the record to `output`.
///
/// Nothing is written when the base page cannot be loaded.
///
/// # Errors
///
/// Returns an error if the options table or renderer cannot be set up, the
/// scrape fails fatally, or the output file cannot be written.
pub(crate) async fn run_scrape(url: &str, output: &Path, config: AppConfig) -> anyhow::Result<()> {
    let options = resolve_options_table(config.options_path.as_deref())
        .context("failed to load options table")?;
    let renderer = HttpRenderer::from_config(&config).context("failed to start renderer")?;

    let mut scraper = MatrixScraper::new(renderer, config, options);
    let record = scraper
        .scrape(url)
        .await
        .with_context(|| format!("failed to scrape {url}"))?;

    write_record(output, &record)?;

    println!(
        "{}: {} option axes, {} variants ({} priced) -> {}",
        record.product.title.as_deref().unwrap_or("unknown product"),
        record.options.len(),
        record.variants.len(),
        record.priced_variant_count(),
        output.display()
    );
    Ok(())
}

/// Writes `record` as pretty-printed JSON, creating parent directories.
pub(crate) fn write_record(output: &Path, record: &MatrixRecord) -> anyhow::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(record).context("failed to serialize record")?;
    std::fs::write(output, json).with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), "wrote matrix record");
    Ok(())
}
