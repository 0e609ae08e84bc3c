use crate::scrapers::flatmates::{extract_listing, parse_search_page, search_page_url};
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::{CrawlSettings, CrawlSummary, LinkDiscovery};
use crate::storage::{LinkCache, ListingSink, ProcessedLinks};
use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::{debug, info, warn};

/// Resumable crawl of one filtered flatmates.com.au search
///
/// Every listing written to the CSV is also recorded in the processed-set
/// file, so an interrupted crawl picks up where it stopped.
pub struct FlatmatesCrawler<S: PageSource> {
    settings: CrawlSettings,
    source: S,
    processed: ProcessedLinks,
    sink: ListingSink,
}

impl<S: PageSource> FlatmatesCrawler<S> {
    /// Load crawl state from disk and open the output file
    pub fn new(settings: CrawlSettings, source: S) -> Result<Self> {
        let processed = ProcessedLinks::load(&settings.processed_file)?;
        let sink = ListingSink::open(&settings.output_csv)?;

        if processed.is_empty() {
            info!("No processed listings in {}, starting fresh", processed.path().display());
        } else {
            info!(
                "{} listings already processed ({})",
                processed.len(),
                processed.path().display()
            );
        }

        Ok(Self {
            settings,
            source,
            processed,
            sink,
        })
    }

    /// Discover listing links and scrape every one not yet processed
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        info!("Starting the scraper ({})", self.source.source_name());

        self.reconcile()?;

        let links = self.discover_links().await?;
        let mut summary = CrawlSummary {
            discovered: links.len(),
            ..CrawlSummary::default()
        };

        let mut pending: Vec<String> = links
            .into_iter()
            .filter(|link| !self.processed.contains(link))
            .collect();
        summary.skipped = summary.discovered - pending.len();

        if let Some(max) = self.settings.max_listings {
            if pending.len() > max {
                info!("Limiting this run to {} of {} new listings", max, pending.len());
                pending.truncate(max);
            }
        }

        info!(
            "Starting to scrape {} new listing links ({} already processed)",
            pending.len(),
            summary.skipped
        );

        let total = pending.len();
        for (idx, link) in pending.iter().enumerate() {
            info!("Scraping {}", link);

            if self.scrape_listing(link).await? {
                summary.scraped += 1;
            } else {
                summary.failed += 1;
            }

            info!("Scraped {}/{} listings", idx + 1, total);
        }

        info!(
            "Finished: {} scraped, {} failed, {} skipped, rows in {}",
            summary.scraped,
            summary.failed,
            summary.skipped,
            self.sink.path().display()
        );

        Ok(summary)
    }

    /// Links for the configured search, from the link cache when allowed
    pub async fn discover_links(&self) -> Result<Vec<String>> {
        let Some(cache_path) = &self.settings.link_cache else {
            return Ok(self.collect_listing_links().await?.links);
        };

        let base_url = &self.settings.base_url;
        let mut cache = LinkCache::load(cache_path)?;

        if !self.settings.refresh_links {
            if let Some(cached) = cache.get(base_url) {
                info!(
                    "Loaded {} listing links from {} (discovered {})",
                    cached.links.len(),
                    cache_path.display(),
                    cached.discovered_at.format("%Y-%m-%d %H:%M UTC")
                );
                return Ok(cached.links.clone());
            }
        }

        let discovery = self.collect_listing_links().await?;
        if discovery.links.is_empty() {
            warn!("No listing links found, leaving link cache untouched");
        } else if !discovery.complete {
            warn!("Pagination did not reach the last page, leaving link cache untouched");
        } else {
            cache.insert(base_url, discovery.links.clone());
            cache.save(cache_path)?;
            debug!("Cached {} links in {}", discovery.links.len(), cache_path.display());
        }

        Ok(discovery.links)
    }

    /// Walk the search result pages until there are no tiles or no next page
    pub async fn collect_listing_links(&self) -> Result<LinkDiscovery> {
        let mut links = Vec::new();
        let mut complete = false;
        let mut seen = HashSet::new();
        let mut page_num: u32 = 1;

        loop {
            if self.settings.max_pages.is_some_and(|max| page_num > max) {
                info!("Reached the limit of {} pages, stopping", page_num - 1);
                break;
            }

            let page_url = search_page_url(&self.settings.base_url, page_num)?;
            let html = match self.source.fetch_rendered(&page_url).await {
                Ok(html) => html,
                Err(err) => {
                    warn!("Failed to load results page {}: {:#}", page_num, err);
                    break;
                }
            };

            let page = parse_search_page(&html, &page_url);
            if page.tile_count == 0 {
                warn!("No listing tiles found on page {}, stopping", page_num);
                self.dump_debug("search", &page_url, &html);
                complete = true;
                break;
            }

            let before = links.len();
            for link in page.links {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
            info!(
                "Extracted {} listing links from page {}",
                links.len() - before,
                page_num
            );

            if !page.has_next {
                info!("No next page element found, stopping");
                complete = true;
                break;
            }
            page_num += 1;
        }

        info!("Extracted {} listing links in total", links.len());
        Ok(LinkDiscovery { links, complete })
    }

    /// Returns `Ok(false)` when the listing could not be scraped this run
    async fn scrape_listing(&mut self, link: &str) -> Result<bool> {
        let html = match self.source.fetch_rendered(link).await {
            Ok(html) => html,
            Err(err) => {
                warn!("Failed to load {}: {:#}", link, err);
                return Ok(false);
            }
        };

        let Some(listing) = extract_listing(&html, link) else {
            self.dump_debug("listing", link, &html);
            return Ok(false);
        };

        // Row first: a crash in between is healed by reconcile() on restart
        self.sink.append(&listing)?;
        self.processed.record(link)?;
        Ok(true)
    }

    /// Record links present in the CSV but missing from the processed set
    fn reconcile(&mut self) -> Result<usize> {
        let mut recovered = 0;
        for url in ListingSink::recorded_urls(&self.settings.output_csv)? {
            if self.processed.record(&url)? {
                recovered += 1;
            }
        }

        if recovered > 0 {
            warn!(
                "Recovered {} links present in {} but missing from {}",
                recovered,
                self.settings.output_csv.display(),
                self.processed.path().display()
            );
        }

        Ok(recovered)
    }

    fn dump_debug(&self, kind: &str, url: &str, html: &str) {
        let Some(dir) = &self.settings.debug_dir else {
            return;
        };

        let name: String = url
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(120)
            .collect();
        // Long URLs can share the truncated prefix
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let path = dir.join(format!("{kind}-{name}-{:016x}.html", hasher.finish()));

        match std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, html)) {
            Ok(()) => info!("Saved page HTML to {} ({} bytes)", path.display(), html.len()),
            Err(err) => warn!("Could not save debug HTML to {}: {}", path.display(), err),
        }
    }
}
