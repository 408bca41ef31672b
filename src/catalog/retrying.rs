use async_trait::async_trait;
use std::sync::Arc;

use super::{CatalogError, DocumentFetcher};
use crate::utils::Retry;

/// A fetcher that retries another fetcher according to a [`Retry`] policy.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    inner: Arc<dyn DocumentFetcher>,
    retry: Retry<CatalogError>,
}

impl RetryingFetcher {
    pub fn new(inner: Arc<dyn DocumentFetcher>, retry: Retry<CatalogError>) -> Self {
        Self { inner, retry }
    }
}

#[async_trait]
impl DocumentFetcher for RetryingFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError> {
        self.retry.run(|| self.inner.fetch(url)).await
    }
}
