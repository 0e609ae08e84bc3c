use std::path::PathBuf;
use std::time::Duration;

/// Default location of the link cache when caching is enabled
pub const DEFAULT_LINK_CACHE: &str = "listing_links.json";

/// Settings for a single crawl of one filtered search
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Filtered search URL the crawl paginates over
    pub base_url: String,
    /// CSV file that receives one row per listing
    pub output_csv: PathBuf,
    /// Processed-set file, one listing URL per line
    pub processed_file: PathBuf,
    /// JSON cache of discovered links keyed by search URL
    pub link_cache: Option<PathBuf>,
    /// Ignore cached links and paginate again
    pub refresh_links: bool,
    /// Time given to client-side rendering after navigation
    pub render_wait: Duration,
    /// Upper bound for navigation and document readiness
    pub page_timeout: Duration,
    pub headless: bool,
    /// Stop paginating after this many search pages
    pub max_pages: Option<u32>,
    /// Stop after attempting this many new listings
    pub max_listings: Option<usize>,
    /// Where to dump HTML of pages that could not be parsed
    pub debug_dir: Option<PathBuf>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            base_url: "https://flatmates.com.au/rooms/sydney".to_string(),
            output_csv: PathBuf::from("listing_data.csv"),
            processed_file: PathBuf::from("scraped_links.txt"),
            link_cache: None,
            refresh_links: false,
            render_wait: Duration::from_secs(3),
            page_timeout: Duration::from_secs(120),
            headless: true,
            max_pages: None,
            max_listings: None,
            debug_dir: None,
        }
    }
}

/// Outcome counters of a crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Unique listing links found for the search
    pub discovered: usize,
    /// Links skipped because they were already processed
    pub skipped: usize,
    /// Listings written to the CSV during this run
    pub scraped: usize,
    /// Listings that could not be loaded or had no listing content
    pub failed: usize,
}

/// Listing links found by walking the search result pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDiscovery {
    pub links: Vec<String>,
    /// Pagination ended on the last results page rather than on a load
    /// failure or the page limit
    pub complete: bool,
}
