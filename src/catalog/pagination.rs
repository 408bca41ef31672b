//! Lazy traversal of a paginated search listing.

use super::{Catalog, CatalogError};
use crate::models::SearchResult;

/// Number of rows the catalog shows per search results page.
pub const RESULTS_PER_PAGE: u32 = 20;

/// Page by page traversal of the results of one search.
///
/// The first page is fetched on creation. `total_results` and `total_pages`
/// come from that first page and never change afterwards. Not meant to be
/// shared: [`next`](Self::next) takes `&mut self`.
///
/// ```rust,no_run
/// # use goodreads_metafetch::catalog::{Catalog, CatalogError};
/// # use goodreads_metafetch::models::SearchQuery;
/// # async fn example(catalog: &Catalog) -> Result<(), CatalogError> {
/// let mut pages = catalog.lookup(SearchQuery::new("how time war")).matches_paginated().await?;
/// println!("{} results across {} pages", pages.total_results(), pages.total_pages());
/// while pages.has_next() {
///     let page = pages.next().await?;
///     if let Some(first) = page.first() {
///         println!("page [{}] --> {} by {}", pages.current_page(), first.title, first.authors_str());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PaginatedResults {
    catalog: Catalog,
    total_results: u32,
    total_pages: u32,
    current_page: u32,
    results: Vec<SearchResult>,
    first_page: Option<Vec<SearchResult>>,
    next_url: Option<String>,
}

impl PaginatedResults {
    /// Fetch the first page of `search_url`.
    ///
    /// Fails with [`CatalogError::MissingElement`] if the page has no results listing.
    pub async fn new(catalog: &Catalog, search_url: &str) -> Result<Self, CatalogError> {
        let page = catalog
            .fetch_search_page(search_url)
            .await?
            .ok_or_else(|| {
                CatalogError::MissingElement(format!("No results listing found at {}", search_url))
            })?;

        let total_results = page
            .total_results
            .unwrap_or(page.results.len() as u32);
        let total_pages = total_results.div_ceil(RESULTS_PER_PAGE).max(1);

        tracing::debug!(
            "Search {} has {} results over {} pages",
            search_url,
            total_results,
            total_pages
        );

        Ok(Self {
            catalog: catalog.clone(),
            total_results,
            total_pages,
            current_page: 0,
            results: page.results.clone(),
            first_page: Some(page.results),
            next_url: page.next_url,
        })
    }

    /// Total number of results announced by the first page
    pub fn total_results(&self) -> u32 {
        self.total_results
    }

    /// Number of pages derived from [`total_results`](Self::total_results)
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Number of pages handed out so far (0 before the first [`next`](Self::next))
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Whether another page can be requested
    pub fn has_next(&self) -> bool {
        self.first_page.is_some() || self.next_url.is_some()
    }

    /// Snapshot of every result fetched so far
    pub fn results(&self) -> Vec<SearchResult> {
        self.results.clone()
    }

    /// Return the rows of the next page.
    ///
    /// The first call returns the page fetched on creation without a request.
    /// Calling this when [`has_next`](Self::has_next) is false is an
    /// [`CatalogError::InvalidState`]. A failed fetch leaves the traversal
    /// where it was, so the call can be repeated.
    pub async fn next(&mut self) -> Result<Vec<SearchResult>, CatalogError> {
        if let Some(rows) = self.first_page.take() {
            self.current_page += 1;
            return Ok(rows);
        }

        let Some(url) = self.next_url.clone() else {
            return Err(CatalogError::InvalidState(format!(
                "No more pages after page {} of {}",
                self.current_page, self.total_pages
            )));
        };

        let page = self.catalog.fetch_search_page(&url).await?.ok_or_else(|| {
            CatalogError::MissingElement(format!("No results listing found at {}", url))
        })?;

        self.current_page += 1;
        self.next_url = page.next_url;
        self.results.extend(page.results.iter().cloned());

        tracing::debug!(
            "Fetched page {} ({} rows, {} accumulated)",
            self.current_page,
            page.results.len(),
            self.results.len()
        );

        Ok(page.results)
    }
}
