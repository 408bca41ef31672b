//! Search results page parsing.

use scraper::Html;

use super::parsing::{element_text, parse_authors, parse_total_results, selector};
use super::{CatalogError, CatalogUrls};
use crate::models::SearchResult;
use crate::utils::{remove_content_in_parentheses, trim_spaces};

/// One parsed page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Result rows, in listing order
    pub results: Vec<SearchResult>,

    /// Total number of results announced in the page summary, if any
    pub total_results: Option<u32>,

    /// Absolute URL of the next results page, if any
    pub next_url: Option<String>,
}

/// Parse a search results page.
///
/// Returns `Ok(None)` when the page has no results listing at all, which is
/// different from a listing with zero rows. Rows without a link are skipped.
pub fn parse_search_page(html: &str, urls: &CatalogUrls) -> Result<Option<SearchPage>, CatalogError> {
    let document = Html::parse_document(html);

    let table_selector = selector("table.tableList")?;
    let row_selector = selector("tr")?;
    let title_selector = selector(".bookTitle")?;
    let author_selector = selector(".authorName__container")?;
    let link_selector = selector("a[href]")?;
    let summary_selector = selector(".searchSubNavContainer")?;
    let next_selector = selector("a.next_page[href]")?;

    let Some(table) = document.select(&table_selector).next() else {
        return Ok(None);
    };

    let mut results = Vec::new();
    for row in table.select(&row_selector) {
        let Some(href) = row
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            tracing::warn!("Skipping search result row without link");
            continue;
        };

        // (...) after a title is the series marker
        let title = row
            .select(&title_selector)
            .next()
            .map(|e| trim_spaces(&remove_content_in_parentheses(&element_text(&e))))
            .unwrap_or_default();

        let authors_text = row
            .select(&author_selector)
            .map(|e| element_text(&e))
            .collect::<Vec<_>>()
            .join(" ");

        results.push(SearchResult {
            title,
            authors: parse_authors(&authors_text),
            url: urls.detail(href),
        });
    }

    let total_results = document
        .select(&summary_selector)
        .next()
        .and_then(|e| parse_total_results(&element_text(&e)));

    let next_url = document
        .select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| urls.absolute(href));

    Ok(Some(SearchPage {
        results,
        total_results,
        next_url,
    }))
}
