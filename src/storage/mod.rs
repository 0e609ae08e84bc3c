//! Durable crawl state: processed links, CSV output and the link cache.

pub mod link_cache;
pub mod processed;
pub mod sink;

pub use link_cache::LinkCache;
pub use processed::ProcessedLinks;
pub use sink::ListingSink;

use anyhow::{Context, Result};
use std::path::Path;

/// Create the parent directory of `path` if it has one
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}
