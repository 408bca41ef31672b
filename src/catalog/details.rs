//! Book detail page extraction.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

use super::parsing::{
    element_text, parse_authors, parse_isbn, parse_pages, parse_publication_date, selector,
};
use super::{Catalog, CatalogError};
use crate::models::{Metadata, SearchQuery, SearchResult};

static BOOK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/book/show/(\d+)").expect("valid book id regex"));

/// Turns the HTML of a detail page into [`Metadata`].
///
/// The catalog changes its markup from time to time; swapping the extractor
/// with [`Catalog::with_extractor`] keeps the rest of the pipeline intact.
pub trait DetailExtractor: Send + Sync + std::fmt::Debug {
    /// Extract the metadata of the page fetched from `url`.
    fn extract(&self, url: &str, html: &str) -> Result<Metadata, CatalogError>;
}

/// Extractor for the current detail page layout: embedded JSON-LD plus
/// `data-testid` tagged elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct BookPageExtractor;

impl BookPageExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DetailExtractor for BookPageExtractor {
    fn extract(&self, url: &str, html: &str) -> Result<Metadata, CatalogError> {
        let document = Html::parse_document(html);
        let ld = book_json_ld(&document)?;

        let id = extract_id(&document, url)?;
        let title = extract_title(&document, ld.as_ref())?;
        let authors = extract_authors(&document)?;

        let isbn = ld
            .as_ref()
            .and_then(|ld| ld.get("isbn"))
            .and_then(Value::as_str)
            .and_then(parse_isbn);

        let pages = match ld.as_ref().and_then(|ld| ld.get("numberOfPages")).and_then(json_u32) {
            Some(pages) => Some(pages),
            None => first_text(&document, "p[data-testid=\"pagesFormat\"]")?
                .as_deref()
                .and_then(parse_pages),
        };

        let pub_date = match first_text(&document, "p[data-testid=\"publicationInfo\"]")? {
            Some(info) => parse_publication_date(&info)?,
            None => None,
        };

        Ok(Metadata {
            title,
            authors,
            url: url.to_string(),
            id,
            isbn,
            pages,
            pub_date,
        })
    }
}

/// The first JSON-LD block describing a book, looking into `@graph` wrappers.
fn book_json_ld(document: &Html) -> Result<Option<Value>, CatalogError> {
    let script_selector = selector("script[type=\"application/ld+json\"]")?;

    for script in document.select(&script_selector) {
        let json: String = script.text().collect();
        let value = match serde_json::from_str::<Value>(json.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Ignoring unreadable JSON-LD block: {}", e);
                continue;
            }
        };

        let candidates = match value.get("@graph").and_then(Value::as_array) {
            Some(graph) => graph.clone(),
            None => match value {
                Value::Array(items) => items,
                other => vec![other],
            },
        };

        if let Some(book) = candidates
            .into_iter()
            .find(|item| item.get("@type").and_then(Value::as_str) == Some("Book"))
        {
            return Ok(Some(book));
        }
    }

    Ok(None)
}

fn extract_id(document: &Html, url: &str) -> Result<String, CatalogError> {
    let attr_selector = selector("[data-book-id]")?;
    if let Some(id) = document
        .select(&attr_selector)
        .next()
        .and_then(|e| e.value().attr("data-book-id"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        return Ok(id.to_string());
    }

    if let Some(caps) = BOOK_ID.captures(url) {
        return Ok(caps[1].to_string());
    }

    let canonical_selector = selector("link[rel=\"canonical\"][href]")?;
    document
        .select(&canonical_selector)
        .next()
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| BOOK_ID.captures(href))
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CatalogError::MissingElement(format!("No book ID found for {}", url)))
}

fn extract_title(document: &Html, ld: Option<&Value>) -> Result<String, CatalogError> {
    if let Some(title) = first_text(document, "h1[data-testid=\"bookTitle\"]")? {
        return Ok(title);
    }

    ld.and_then(|ld| ld.get("name"))
        .and_then(Value::as_str)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CatalogError::MissingElement("Book title not found".to_string()))
}

fn extract_authors(document: &Html) -> Result<Vec<String>, CatalogError> {
    let list_selector = selector(".ContributorLinksList")?;
    let link_selector = selector("a.ContributorLink")?;
    let name_selector = selector("[data-testid=\"name\"]")?;
    let role_selector = selector("[data-testid=\"role\"]")?;

    let list = document
        .select(&list_selector)
        .next()
        .ok_or_else(|| CatalogError::MissingElement("Contributor list not found".to_string()))?;

    let entries: Vec<String> = list
        .select(&link_selector)
        .filter_map(|link| {
            let name = child_text(&link, &name_selector)?;
            Some(match child_text(&link, &role_selector) {
                Some(role) => format!("{} {}", name, role),
                None => name,
            })
        })
        .collect();

    let mut authors: Vec<String> = Vec::new();
    for author in parse_authors(&format!("by {}", entries.join(", "))) {
        if !authors.contains(&author) {
            authors.push(author);
        }
    }

    if authors.is_empty() {
        return Err(CatalogError::Parse(format!(
            "No main author among contributors: {}",
            entries.join(", ")
        )));
    }
    Ok(authors)
}

fn child_text(element: &ElementRef, sel: &Selector) -> Option<String> {
    element
        .select(sel)
        .next()
        .map(|e| element_text(&e))
        .filter(|s| !s.is_empty())
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>, CatalogError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|e| element_text(&e))
        .filter(|s| !s.is_empty()))
}

fn json_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Metadata {
    /// Search for a book and return the metadata of the best match.
    ///
    /// ```rust,no_run
    /// # use goodreads_metafetch::{Catalog, CatalogError, Metadata, SearchQuery};
    /// # async fn example(catalog: &Catalog) -> Result<(), CatalogError> {
    /// let query = SearchQuery::new("La nuit du renard").with_author("Mary Higgins Clark");
    /// let metadata = Metadata::lookup(catalog, query).await?;
    /// println!("{} ({:?} pages)", metadata.title, metadata.pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn lookup(catalog: &Catalog, query: SearchQuery) -> Result<Metadata, CatalogError> {
        let result = catalog.lookup(query).find_best_match().await?;
        result.metadata(catalog).await
    }

    /// Metadata of the detail page at `url`.
    pub async fn from_url(catalog: &Catalog, url: &str) -> Result<Metadata, CatalogError> {
        catalog.metadata_from_url(url).await
    }

    /// Metadata of the book with catalog ID `id`.
    pub async fn from_id(catalog: &Catalog, id: &str) -> Result<Metadata, CatalogError> {
        let url = catalog.urls().book(id);
        catalog.metadata_from_url(&url).await
    }
}

impl SearchResult {
    /// Fetch the detail page of this result.
    pub async fn metadata(&self, catalog: &Catalog) -> Result<Metadata, CatalogError> {
        catalog.metadata_from_url(&self.url).await
    }
}
