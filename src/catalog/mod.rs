//! Catalog client: search pages, pagination, matching and detail extraction.
//!
//! Everything here targets the conventions of one catalog (Goodreads). The only
//! network surface is the [`DocumentFetcher`] trait: the real implementation is
//! [`HttpClient`](crate::utils::HttpClient), and tests swap in a
//! [`StaticFetcher`](mock::StaticFetcher).
//!
//! # Flow
//!
//! ```text
//! SearchQuery -> Lookup::find_best_match -> SearchResult -> Metadata
//!                   |  first result page       |  detail page
//!                   v                          v
//!              search::parse_search_page   details::DetailExtractor
//! ```

mod client;
mod details;
mod lookup;
mod pagination;
mod retrying;
mod search;
mod urls;

pub mod mock;
pub mod parsing;

pub use client::Catalog;
pub use details::{BookPageExtractor, DetailExtractor};
pub use lookup::{Lookup, MatchPass};
pub use pagination::{PaginatedResults, RESULTS_PER_PAGE};
pub use retrying::RetryingFetcher;
pub use search::{parse_search_page, SearchPage};
pub use urls::{CatalogUrls, DEFAULT_BASE_URL};

use async_trait::async_trait;

/// Fetch the HTML of a page.
///
/// Implementations follow redirects and fail on a non-2xx final status with
/// [`CatalogError::Fetch`], whose message carries the status code.
#[async_trait]
pub trait DocumentFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError>;
}

/// Errors that can occur when talking to the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No search result matched the query
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required element is missing from a fetched page
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// Required text is present but does not follow the expected format
    #[error("Parse error: {0}")]
    Parse(String),

    /// The server answered with a non-2xx status
    #[error("Server returned HTTP response code: {status} for URL: {url}")]
    Fetch { url: String, status: u16 },

    /// Transport failure (DNS, connection, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// An operation was called in a state that does not allow it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogError {
    /// HTTP status of a failed fetch, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a 5xx answer, the only error presumed to go away on retry
    pub fn is_server_fault(&self) -> bool {
        self.status().is_some_and(|status| (500..=599).contains(&status))
    }
}
