use std::sync::Arc;
use std::time::Duration;

use super::details::{BookPageExtractor, DetailExtractor};
use super::lookup::Lookup;
use super::pagination::PaginatedResults;
use super::retrying::RetryingFetcher;
use super::search::{parse_search_page, SearchPage};
use super::{CatalogError, CatalogUrls, DocumentFetcher};
use crate::config::Config;
use crate::models::{Metadata, SearchQuery, SearchResult};
use crate::utils::{HttpClient, Retry};

/// Entry point to the catalog: a fetcher, a detail page extractor and the
/// URL conventions of the catalog instance.
///
/// Cloning is cheap, fetcher and extractor are shared.
#[derive(Clone, Debug)]
pub struct Catalog {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn DetailExtractor>,
    urls: CatalogUrls,
}

impl Catalog {
    /// Catalog at the default base URL, reading pages through `fetcher`.
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(BookPageExtractor::new()),
            urls: CatalogUrls::default(),
        }
    }

    /// Build an HTTP backed catalog from configuration.
    ///
    /// When retries are enabled, every fetch goes through a [`RetryingFetcher`].
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let http = HttpClient::with_settings(
            &config.catalog.user_agent,
            Duration::from_secs(config.catalog.timeout_secs),
            Duration::from_secs(config.catalog.connect_timeout_secs),
        )?;

        let fetcher: Arc<dyn DocumentFetcher> = if config.retry.enabled {
            let retry = Retry::new(config.retry.to_configuration()?);
            tracing::debug!("Fetching with retries: {:?}", retry.configuration());
            Arc::new(RetryingFetcher::new(Arc::new(http), retry))
        } else {
            Arc::new(http)
        };

        Ok(Self::new(fetcher).with_urls(CatalogUrls::new(config.catalog.base_url.as_str())))
    }

    pub fn with_urls(mut self, urls: CatalogUrls) -> Self {
        self.urls = urls;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn DetailExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn urls(&self) -> &CatalogUrls {
        &self.urls
    }

    /// Prepare a search for `query`. Nothing is fetched until a method of
    /// [`Lookup`] is awaited.
    pub fn lookup(&self, query: SearchQuery) -> Lookup<'_> {
        Lookup::new(self, query)
    }

    /// Fetch and parse a search results page.
    ///
    /// `Ok(None)` means the page has no results listing.
    pub async fn fetch_search_page(&self, url: &str) -> Result<Option<SearchPage>, CatalogError> {
        let html = self.fetcher.fetch(url).await?;
        parse_search_page(&html, &self.urls)
    }

    /// Rows of a single search results page, `Ok(None)` if it has no listing.
    pub async fn fetch_page(&self, url: &str) -> Result<Option<Vec<SearchResult>>, CatalogError> {
        Ok(self.fetch_search_page(url).await?.map(|page| page.results))
    }

    /// Start a paginated traversal of the search at `search_url`.
    pub async fn paginate(&self, search_url: &str) -> Result<PaginatedResults, CatalogError> {
        PaginatedResults::new(self, search_url).await
    }

    /// Fetch a detail page and extract its metadata.
    pub async fn metadata_from_url(&self, url: &str) -> Result<Metadata, CatalogError> {
        let html = self.fetcher.fetch(url).await?;
        let metadata = self.extractor.extract(url, &html)?;
        tracing::debug!("Extracted metadata for '{}' ({})", metadata.title, metadata.id);
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::{search_page_html, BookPage, ResultRow, StaticFetcher};

    #[tokio::test]
    async fn test_fetch_page_distinguishes_missing_listing() {
        let fetcher = StaticFetcher::new()
            .with_page("http://c.test/empty", search_page_html(&[], None, None))
            .with_page("http://c.test/none", "<html><body></body></html>")
            .with_page(
                "http://c.test/one",
                search_page_html(&[ResultRow::new("One", &["A"], "/book/show/1")], None, None),
            );
        let catalog = Catalog::new(Arc::new(fetcher)).with_urls(CatalogUrls::new("http://c.test"));

        assert_eq!(catalog.fetch_page("http://c.test/empty").await.unwrap(), Some(vec![]));
        assert_eq!(catalog.fetch_page("http://c.test/none").await.unwrap(), None);

        let rows = catalog.fetch_page("http://c.test/one").await.unwrap().unwrap();
        assert_eq!(rows[0].url, "http://c.test/book/show/1");
    }

    #[tokio::test]
    async fn test_metadata_from_url() {
        let url = "http://c.test/book/show/7";
        let page = BookPage::new("7", "Seven").contributor("Some Author", None);
        let fetcher = StaticFetcher::new().with_page(url, page.to_html());
        let catalog = Catalog::new(Arc::new(fetcher)).with_urls(CatalogUrls::new("http://c.test"));

        let metadata = catalog.metadata_from_url(url).await.unwrap();
        assert_eq!(metadata.id, "7");
        assert_eq!(metadata.title, "Seven");
        assert_eq!(metadata.url, url);
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let err = catalog
            .metadata_from_url("http://c.test/book/show/404")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let mut config = Config::default();
        config.catalog.base_url = "http://localhost:9999/".to_string();
        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.urls().home(), "http://localhost:9999");
    }

    #[test]
    fn test_from_config_rejects_bad_retry_settings() {
        let mut config = Config::default();
        config.retry.enabled = true;
        config.retry.max_retries = 0;
        assert!(matches!(
            Catalog::from_config(&config),
            Err(CatalogError::InvalidConfig(_))
        ));
    }
}
