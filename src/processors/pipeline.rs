use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fetch::{CoaddSource, HttpCoaddSource};
use crate::processors::{FailedExtraction, Harvester, StackOrder, TableAggregator};
use crate::readers::{CoaddReader, UrlListReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvTableWriter, FitsInspector, FitsSummary, FitsTableWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// What a completed run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    pub attempted: usize,
    pub extracted: usize,
    pub failures: Vec<FailedExtraction>,
    pub rows: usize,
    pub columns: Vec<String>,
    pub csv_output: PathBuf,
    pub fits_output: PathBuf,
    /// Re-read of the written FITS file; an error here does not undo the outputs
    pub verification: Result<FitsSummary>,
}

impl PipelineOutcome {
    pub fn summary(&self) -> String {
        format!(
            "Run Summary:\n  URLs: {}\n  Extracted: {}\n  Failed: {}\n  Rows written: {}\n  Columns: {}\n  CSV: {}\n  FITS: {}",
            self.attempted,
            self.extracted,
            self.failures.len(),
            self.rows,
            self.columns.join(", "),
            self.csv_output.display(),
            self.fits_output.display()
        )
    }
}

/// read URLs → fetch → extract → stack → write CSV and FITS → inspect
pub struct Pipeline {
    config: PipelineConfig,
    source: Arc<dyn CoaddSource>,
}

impl Pipeline {
    /// Validate `config` and fetch over HTTP with its timeout
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate_config()?;
        let reader = CoaddReader::new()
            .with_extension(&config.extension)
            .with_columns(&config.columns);
        let source = HttpCoaddSource::new(reader, config.timeout())?;
        Ok(Self {
            config,
            source: Arc::new(source),
        })
    }

    /// Use a custom source instead of HTTP
    pub fn with_source(config: PipelineConfig, source: Arc<dyn CoaddSource>) -> Result<Self> {
        config.validate_config()?;
        Ok(Self { config, source })
    }

    pub async fn run(&self, progress_silent: bool) -> Result<PipelineOutcome> {
        let config = &self.config;

        let urls = UrlListReader::with_url_column(&config.url_column)
            .read_urls(&config.input)
            .map_err(|e| {
                error!(
                    "Process failed: could not load URLs from {}: {}",
                    config.input.display(),
                    e
                );
                e
            })?;
        info!(count = urls.len(), input = %config.input.display(), "loaded URL list");

        let progress = ProgressReporter::new(
            urls.len() as u64,
            "Downloading spectra...",
            progress_silent,
        );
        let harvester = Harvester::new(Arc::clone(&self.source), config.max_workers);
        let report = harvester.harvest(&urls, Some(&progress)).await?;
        progress.finish_with_message(&format!(
            "Extracted {} of {} files",
            report.tables.len(),
            report.attempted
        ));
        info!(
            attempted = report.attempted,
            extracted = report.tables.len(),
            failed = report.failures.len(),
            rows = report.total_rows(),
            "harvest finished"
        );

        let order = if config.completion_order {
            StackOrder::Completion
        } else {
            StackOrder::Input
        };
        let attempted = report.attempted;
        let extracted = report.tables.len();
        let combined = TableAggregator::with_order(order).stack(report.tables)?;

        CsvTableWriter::with_header(config.csv_header).write(&combined, &config.csv_output)?;
        FitsTableWriter::new(&config.extension).write(&combined, &config.fits_output)?;
        info!(
            rows = combined.num_rows(),
            csv = %config.csv_output.display(),
            fits = %config.fits_output.display(),
            "The fits file has been created"
        );

        let verification = FitsInspector::new().inspect(&config.fits_output, &config.extension);

        Ok(PipelineOutcome {
            attempted,
            extracted,
            failures: report.failures,
            rows: combined.num_rows(),
            columns: combined.column_names(),
            csv_output: config.csv_output.clone(),
            fits_output: config.fits_output.clone(),
            verification,
        })
    }
}
