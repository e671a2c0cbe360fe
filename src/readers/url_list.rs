use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_URL_COLUMN;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads the download list from a CSV dump with a header row
pub struct UrlListReader {
    url_column: String,
}

impl UrlListReader {
    pub fn new() -> Self {
        Self {
            url_column: DEFAULT_URL_COLUMN.to_string(),
        }
    }

    pub fn with_url_column(url_column: &str) -> Self {
        Self {
            url_column: url_column.to_string(),
        }
    }

    /// Read the URL column from the file at `path`, in row order
    pub fn read_urls(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path)?;
        self.read_urls_from(file, &path.display().to_string())
    }

    /// Read the URL column from any CSV source.
    ///
    /// A row too short to reach the URL column yields an empty URL, which
    /// then fails on its own instead of aborting the whole list.
    pub fn read_urls_from<R: Read>(&self, source: R, context: &str) -> Result<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(source);

        let column_index = reader
            .headers()?
            .iter()
            .position(|h| h == self.url_column)
            .ok_or_else(|| ProcessingError::MissingColumn {
                column: self.url_column.clone(),
                context: context.to_string(),
            })?;

        let mut urls = Vec::new();
        for record in reader.records() {
            let record = record?;
            urls.push(record.get(column_index).unwrap_or_default().to_string());
        }

        Ok(urls)
    }
}

impl Default for UrlListReader {
    fn default() -> Self {
        Self::new()
    }
}
