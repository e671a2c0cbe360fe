pub mod http_source;

pub use http_source::HttpCoaddSource;

use crate::error::Result;
use crate::models::CoaddTable;
use async_trait::async_trait;

/// Produces the projected table for one URL.
///
/// The harvester calls `extract` exactly once per input URL.
#[async_trait]
pub trait CoaddSource: Send + Sync {
    async fn extract(&self, url: &str) -> Result<CoaddTable>;
}
