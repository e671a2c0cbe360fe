pub mod aggregator;
pub mod harvester;
pub mod pipeline;

pub use aggregator::{StackOrder, TableAggregator};
pub use harvester::{ExtractOutcome, FailedExtraction, HarvestReport, Harvester};
pub use pipeline::{Pipeline, PipelineOutcome};
