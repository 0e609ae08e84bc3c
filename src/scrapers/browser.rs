use crate::scrapers::traits::PageSource;
use crate::scrapers::types::CrawlSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Page source backed by a single Chrome tab
pub struct ChromePageSource {
    // Dropping the browser kills Chrome, so it lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
    render_wait: Duration,
    page_timeout: Duration,
}

impl ChromePageSource {
    /// Launch Chrome and open the tab used for every fetch
    pub fn launch(settings: &CrawlSettings) -> Result<Self> {
        info!(
            "Launching Chrome ({})...",
            if settings.headless { "headless" } else { "headed" }
        );

        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(settings.page_timeout * 2)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(settings.page_timeout);

        Ok(Self {
            _browser: browser,
            tab,
            render_wait: settings.render_wait,
            page_timeout: settings.page_timeout,
        })
    }
}

#[async_trait]
impl PageSource for ChromePageSource {
    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        let tab = Arc::clone(&self.tab);
        let url = url.to_string();
        let render_wait = self.render_wait;
        let page_timeout = self.page_timeout;

        tokio::task::spawn_blocking(move || load_page(&tab, &url, render_wait, page_timeout))
            .await
            .context("Browser task panicked")?
    }

    fn source_name(&self) -> &'static str {
        "chrome"
    }
}

fn load_page(tab: &Tab, url: &str, render_wait: Duration, page_timeout: Duration) -> Result<String> {
    debug!("Navigating to {}", url);
    tab.navigate_to(url)
        .with_context(|| format!("Failed to navigate to {url}"))?
        .wait_until_navigated()
        .with_context(|| format!("Navigation to {url} did not finish"))?;

    // Listing pages render client-side after the load event
    thread::sleep(render_wait);
    wait_for_ready_state(tab, page_timeout)?;

    let html_result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .context("Failed to read page HTML")?;

    match html_result.value.as_ref().and_then(|value| value.as_str()) {
        Some(html) => {
            debug!("Captured {} bytes of HTML from {}", html.len(), url);
            Ok(html.to_string())
        }
        None => anyhow::bail!("Page {url} returned no HTML"),
    }
}

fn wait_for_ready_state(tab: &Tab, page_timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + page_timeout;

    loop {
        let state = tab
            .evaluate("document.readyState", false)
            .context("Failed to query document.readyState")?;

        if state.value.as_ref().and_then(|value| value.as_str()) == Some("complete") {
            return Ok(());
        }

        if Instant::now() >= deadline {
            warn!("Document not complete after {:?}, reading it anyway", page_timeout);
            return Ok(());
        }

        thread::sleep(READY_POLL_INTERVAL);
    }
}
