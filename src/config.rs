use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_COLUMNS, DEFAULT_CSV_OUTPUT, DEFAULT_EXTENSION, DEFAULT_FITS_OUTPUT,
    DEFAULT_INPUT_FILE, DEFAULT_MAX_WORKERS, DEFAULT_TIMEOUT_SECS, DEFAULT_URL_COLUMN, ENV_PREFIX,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

/// Everything one pipeline run needs: paths, pool size, and what to extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub csv_output: PathBuf,
    pub fits_output: PathBuf,

    #[validate(length(min = 1))]
    pub url_column: String,

    #[validate(length(min = 1))]
    pub extension: String,

    #[validate(length(min = 1))]
    pub columns: Vec<String>,

    #[validate(range(min = 1, max = 256))]
    pub max_workers: usize,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Write column names as the first CSV line
    pub csv_header: bool,

    /// Stack tables in the order downloads finished instead of input order
    pub completion_order: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            csv_output: PathBuf::from(DEFAULT_CSV_OUTPUT),
            fits_output: PathBuf::from(DEFAULT_FITS_OUTPUT),
            url_column: DEFAULT_URL_COLUMN.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            csv_header: false,
            completion_order: false,
        }
    }
}

impl PipelineConfig {
    /// Layer defaults, an optional config file and `COADD_*` environment variables
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("columns"),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Field-level checks plus the ones the derive cannot express
    pub fn validate_config(&self) -> Result<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.trim().is_empty() {
                return Err(ProcessingError::Config(
                    "Column names must not be empty".to_string(),
                ));
            }
            if !seen.insert(column.as_str()) {
                return Err(ProcessingError::Config(format!(
                    "Column '{}' is listed more than once",
                    column
                )));
            }
        }

        if self.csv_output == self.fits_output {
            return Err(ProcessingError::Config(format!(
                "CSV and FITS outputs both point to {}",
                self.csv_output.display()
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
