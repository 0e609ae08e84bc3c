use anyhow::Result;
use async_trait::async_trait;

/// Source of rendered page HTML
///
/// The crawl loop only ever sees HTML after client-side rendering, so the
/// browser can be swapped for anything that produces the same markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Load `url`, wait for rendering and return the document's outer HTML
    async fn fetch_rendered(&self, url: &str) -> Result<String>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}
