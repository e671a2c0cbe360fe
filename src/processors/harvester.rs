use crate::error::Result;
use crate::fetch::CoaddSource;
use crate::models::CoaddTable;
use crate::utils::progress::ProgressReporter;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// A URL that could not be turned into a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedExtraction {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// Result of one fetch-and-extract unit
#[derive(Debug)]
pub enum ExtractOutcome {
    Extracted(CoaddTable),
    Failed(FailedExtraction),
}

#[derive(Debug, Default)]
pub struct HarvestReport {
    /// Successful tables, in completion order
    pub tables: Vec<CoaddTable>,
    pub failures: Vec<FailedExtraction>,
    pub attempted: usize,
}

impl HarvestReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(CoaddTable::num_rows).sum()
    }
}

/// Runs a [`CoaddSource`] over many URLs on a fixed-size worker pool
pub struct Harvester {
    source: Arc<dyn CoaddSource>,
    max_workers: usize,
}

impl Harvester {
    pub fn new(source: Arc<dyn CoaddSource>, max_workers: usize) -> Self {
        Self {
            source,
            max_workers: max_workers.max(1),
        }
    }

    /// Extract every URL once, collecting outcomes as they complete.
    ///
    /// Per-URL failures are logged and recorded; only a panicked task
    /// fails the whole harvest.
    pub async fn harvest(
        &self,
        urls: &[String],
        progress: Option<&ProgressReporter>,
    ) -> Result<HarvestReport> {
        let permits = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return ExtractOutcome::Failed(FailedExtraction {
                            index,
                            url,
                            reason: e.to_string(),
                        })
                    }
                };

                match source.extract(&url).await {
                    Ok(table) => ExtractOutcome::Extracted(table.with_source(index, url)),
                    Err(e) => ExtractOutcome::Failed(FailedExtraction {
                        index,
                        url,
                        reason: e.to_string(),
                    }),
                }
            });
        }

        let mut report = HarvestReport {
            attempted: urls.len(),
            ..HarvestReport::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined? {
                ExtractOutcome::Extracted(table) => {
                    debug!(
                        url = table.source().map(|s| s.url.as_str()).unwrap_or_default(),
                        rows = table.num_rows(),
                        "extracted"
                    );
                    report.tables.push(table);
                }
                ExtractOutcome::Failed(failure) => {
                    let log = || warn!("Failed to process {}: {}", failure.url, failure.reason);
                    match progress {
                        Some(p) => p.suspend(log),
                        None => log(),
                    }
                    report.failures.push(failure);
                }
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        Ok(report)
    }
}
