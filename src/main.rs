mod cli;
mod models;
mod scrapers;
mod storage;

use clap::Parser;
use cli::{prompt_for_url, validate_search_url, Cli};
use scrapers::{ChromePageSource, FlatmatesCrawler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "info,flatshare_scout=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("🏠 Flatshare Scout - flatmates.com.au room scraper");
    info!("==================================================");

    let raw_url = match cli.url.clone() {
        Some(url) => url,
        None => prompt_for_url()?,
    };
    let base_url = validate_search_url(&raw_url)?;
    let settings = cli.into_settings(base_url);

    info!("Search: {}", settings.base_url);
    info!("Output: {}", settings.output_csv.display());

    let source = ChromePageSource::launch(&settings)?;
    let mut crawler = FlatmatesCrawler::new(settings, source)?;
    let summary = crawler.run().await?;

    info!(
        "✅ {} new listings scraped, {} failed, {} already done ({} found)",
        summary.scraped, summary.failed, summary.skipped, summary.discovered
    );

    Ok(())
}
