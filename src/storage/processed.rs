use crate::storage::ensure_parent_dir;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only set of listing URLs that have already been written out
#[derive(Debug)]
pub struct ProcessedLinks {
    path: PathBuf,
    seen: HashSet<String>,
    // Set when the file on disk does not end with a newline
    needs_newline: bool,
}

impl ProcessedLinks {
    /// Read the processed-set file, treating a missing file as empty
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read processed links {}", path.display()))
            }
        };

        let seen: HashSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!("Loaded {} processed links from {}", seen.len(), path.display());

        Ok(Self {
            needs_newline: !contents.is_empty() && !contents.ends_with('\n'),
            path,
            seen,
        })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url.trim())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `url` as processed
    ///
    /// Returns `false` without touching the file when the URL was already
    /// recorded.
    pub fn record(&mut self, url: &str) -> Result<bool> {
        let url = url.trim();
        if url.is_empty() || self.seen.contains(url) {
            return Ok(false);
        }

        ensure_parent_dir(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let prefix = if self.needs_newline { "\n" } else { "" };
        writeln!(file, "{prefix}{url}")
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        self.needs_newline = false;
        self.seen.insert(url.to_string());
        Ok(true)
    }
}
