use crate::error::Result;
use crate::fetch::CoaddSource;
use crate::models::CoaddTable;
use crate::readers::CoaddReader;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::debug;
use url::Url;

/// Downloads FITS files over HTTP(S) and extracts the configured columns
#[derive(Clone)]
pub struct HttpCoaddSource {
    client: Client,
    reader: Arc<CoaddReader>,
}

impl HttpCoaddSource {
    /// Build a source whose requests give up after `timeout`
    pub fn new(reader: CoaddReader, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, reader))
    }

    pub fn with_client(client: Client, reader: CoaddReader) -> Self {
        Self {
            client,
            reader: Arc::new(reader),
        }
    }

    /// GET `url` and return the body; non-2xx statuses are errors
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)?;
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CoaddSource for HttpCoaddSource {
    async fn extract(&self, url: &str) -> Result<CoaddTable> {
        let body = self.fetch_bytes(url).await?;
        debug!(url = %url, bytes = body.len(), "downloaded");

        // cfitsio is blocking; keep it off the async workers
        let reader = Arc::clone(&self.reader);
        let table = task::spawn_blocking(move || reader.read_bytes(&body)).await??;
        Ok(table)
    }
}
