use std::future::Future;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{CrrError, Result};

/// Source of raw page text. The core never retries; a failed fetch is surfaced.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>>;
}

/// Plain HTTP GET via reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        info!("GET {}", url);

        let fetch_err = |e: reqwest::Error| CrrError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)?;

        debug!(
            "Fetched {} bytes from {} in {}ms",
            body.len(),
            url,
            start.elapsed().as_millis()
        );
        Ok(body)
    }
}
