use crate::storage::ensure_parent_dir;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Listing links discovered for one filtered search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedLinks {
    pub discovered_at: DateTime<Utc>,
    pub links: Vec<String>,
}

/// Discovered listing links keyed by the search URL they came from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct LinkCache {
    searches: BTreeMap<String, CachedLinks>,
}

impl LinkCache {
    /// Read the cache file; a missing file yields an empty cache
    pub fn load(path: &Path) -> Result<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read link cache {}", path.display()))
            }
        };

        serde_json::from_str(&json)
            .with_context(|| format!("Link cache {} is not valid JSON", path.display()))
    }

    pub fn get(&self, search_url: &str) -> Option<&CachedLinks> {
        self.searches.get(search_url)
    }

    pub fn insert(&mut self, search_url: &str, links: Vec<String>) {
        self.searches.insert(
            search_url.to_string(),
            CachedLinks {
                discovered_at: Utc::now(),
                links,
            },
        );
    }

    /// Write the cache, replacing the previous file only once fully written
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self).context("Failed to serialize link cache")?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move {} to {}", tmp.display(), path.display()))?;
        Ok(())
    }
}
