//! Command-line interface and search URL validation.

use crate::scrapers::types::{CrawlSettings, DEFAULT_LINK_CACHE};
use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

/// Scrape room listings from a filtered flatmates.com.au search into a CSV file.
///
/// Rerunning with the same output files resumes where the last run stopped.
///
/// ```sh
/// flatshare-scout "https://flatmates.com.au/rooms/sydney/max-400"
/// flatshare-scout --cache-links --headed -o sydney.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Filtered search URL; prompted for when omitted
    #[arg(env = "FLATSHARE_URL")]
    pub url: Option<String>,

    /// CSV file receiving one row per listing
    #[arg(short, long, default_value = "listing_data.csv")]
    pub output: PathBuf,

    /// File holding already processed listing URLs
    #[arg(short, long, default_value = "scraped_links.txt")]
    pub processed_file: PathBuf,

    /// Reuse discovered listing links instead of paginating again
    #[arg(long)]
    pub cache_links: bool,

    /// Location of the link cache
    #[arg(long, default_value = DEFAULT_LINK_CACHE)]
    pub link_cache: PathBuf,

    /// Paginate again even if the link cache has this search
    #[arg(long, requires = "cache_links")]
    pub refresh_links: bool,

    /// Seconds to wait for client-side rendering after each navigation
    #[arg(long, default_value_t = 3)]
    pub render_wait_secs: u64,

    /// Seconds before a page load is given up
    #[arg(long, default_value_t = 120)]
    pub page_timeout_secs: u64,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Stop paginating after this many result pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Scrape at most this many new listings
    #[arg(long)]
    pub max_listings: Option<usize>,

    /// Save HTML of pages that could not be parsed here
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_settings(self, base_url: String) -> CrawlSettings {
        CrawlSettings {
            base_url,
            output_csv: self.output,
            processed_file: self.processed_file,
            link_cache: self.cache_links.then_some(self.link_cache),
            refresh_links: self.refresh_links,
            render_wait: Duration::from_secs(self.render_wait_secs),
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            headless: !self.headed,
            max_pages: self.max_pages,
            max_listings: self.max_listings,
            debug_dir: self.debug_dir,
        }
    }
}

/// Ask for the search URL on stdin
pub fn prompt_for_url() -> Result<String> {
    print!("Please input the URL of the filtered listing page: ");
    io::stdout().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read URL from stdin")?;
    Ok(line.trim().to_string())
}

/// Check that `input` points at flatmates.com.au and return it with a scheme
pub fn validate_search_url(input: &str) -> Result<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?flatmates\.com\.au/?.*$").expect("URL pattern is valid")
    });

    let input = input.trim();
    if !pattern.is_match(input) {
        anyhow::bail!("Invalid URL: {input}");
    }

    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    let url = Url::parse(&with_scheme).with_context(|| format!("Invalid URL: {input}"))?;
    match url.host_str() {
        Some("flatmates.com.au" | "www.flatmates.com.au") => Ok(with_scheme),
        _ => anyhow::bail!("Invalid URL: {input}"),
    }
}
