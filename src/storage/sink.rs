use crate::models::ListingData;
use crate::storage::ensure_parent_dir;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CSV file receiving one row per scraped listing
pub struct ListingSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl ListingSink {
    /// Open `path` for appending, writing the header row if the file is new
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let is_new = fs::metadata(&path).map(|meta| meta.len() == 0).unwrap_or(true);
        if !is_new {
            check_header(&path)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if is_new {
            info!("Creating {}", path.display());
            writer
                .write_record(ListingData::CSV_HEADERS)
                .with_context(|| format!("Failed to write header to {}", path.display()))?;
            writer
                .flush()
                .with_context(|| format!("Failed to flush {}", path.display()))?;
        }

        Ok(Self { path, writer })
    }

    /// Append one listing and flush it to disk
    pub fn append(&mut self, listing: &ListingData) -> Result<()> {
        self.writer
            .serialize(listing)
            .with_context(|| format!("Failed to write row to {}", self.path.display()))?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Listing URLs already present in an output file
    pub fn recorded_urls(path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();

        let Some(url_column) = headers.iter().position(|name| name == "url") else {
            warn!("{} has no url column", path.display());
            return Ok(Vec::new());
        };

        let mut urls = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
            if let Some(url) = record.get(url_column).map(str::trim).filter(|url| !url.is_empty()) {
                urls.push(url.to_string());
            }
        }

        Ok(urls)
    }
}

fn check_header(path: &Path) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?;

    if !headers.iter().eq(ListingData::CSV_HEADERS) {
        warn!(
            "{} has columns [{}], new rows use [{}]",
            path.display(),
            headers.iter().collect::<Vec<_>>().join(","),
            ListingData::CSV_HEADERS.join(",")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn listing(url: &str) -> ListingData {
        let mut listing = ListingData::empty(url);
        listing.price_per_week = 320;
        listing.beds = 3;
        listing.room_overview = "Private room (Furnished), Min stay (3 months)".to_string();
        listing.property_about = "Line one, with \"quotes\"\nline two".to_string();
        listing
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap()
            .records()
            .map(|record| record.unwrap())
            .collect()
    }

    #[test]
    fn header_written_on_first_open_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("listing_data.csv");

        let mut sink = ListingSink::open(&path).unwrap();
        sink.append(&listing("https://flatmates.com.au/P1")).unwrap();
        drop(sink);

        let mut sink = ListingSink::open(&path).unwrap();
        sink.append(&listing("https://flatmates.com.au/P2")).unwrap();
        drop(sink);

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].iter().eq(ListingData::CSV_HEADERS));
        assert_eq!(&rows[1][10], "https://flatmates.com.au/P1");
        assert_eq!(&rows[2][10], "https://flatmates.com.au/P2");
    }

    #[test]
    fn rows_match_header_width_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listing_data.csv");

        let mut sink = ListingSink::open(&path).unwrap();
        sink.append(&listing("https://flatmates.com.au/P1")).unwrap();
        sink.append(&ListingData::empty("https://flatmates.com.au/P2")).unwrap();

        let rows = read_rows(&path);
        for row in &rows {
            assert_eq!(row.len(), ListingData::CSV_HEADERS.len());
        }
        assert_eq!(&rows[1][0], "320");
        assert_eq!(&rows[1][1], "3");
        assert_eq!(&rows[1][2], "-1");
        assert_eq!(&rows[1][7], "Line one, with \"quotes\"\nline two");
        assert_eq!(&rows[2][4], "N/A");
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listing_data.csv");
        fs::write(&path, "").unwrap();

        ListingSink::open(&path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].iter().eq(ListingData::CSV_HEADERS));
    }

    #[test]
    fn recorded_urls_reads_url_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listing_data.csv");
        assert!(ListingSink::recorded_urls(&path).unwrap().is_empty());

        let mut sink = ListingSink::open(&path).unwrap();
        sink.append(&listing("https://flatmates.com.au/P1")).unwrap();
        sink.append(&listing("https://flatmates.com.au/P2")).unwrap();

        assert_eq!(
            ListingSink::recorded_urls(&path).unwrap(),
            vec!["https://flatmates.com.au/P1", "https://flatmates.com.au/P2"]
        );
    }

    #[test]
    fn recorded_urls_without_url_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listing_data.csv");
        fs::write(&path, "price_per_week,beds\n300,2\n").unwrap();

        assert!(ListingSink::recorded_urls(&path).unwrap().is_empty());
    }
}
