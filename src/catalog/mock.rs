//! In-memory fetcher and page fixtures for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::catalog::{CatalogError, DocumentFetcher};

/// A fetcher that serves predefined pages and records every request.
///
/// Unknown URLs answer with a 404 [`CatalogError::Fetch`]. Failures queued
/// with [`StaticFetcher::fail_next`] are served, in order, before the page.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, VecDeque<CatalogError>>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Create a new fetcher with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.set_page(url, html);
        self
    }

    /// Serve `html` for `url`, replacing any previous page.
    pub fn set_page(&self, url: impl Into<String>, html: impl Into<String>) {
        let mut guard = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(url.into(), html.into());
    }

    /// Fail the next request to `url` with `error`.
    pub fn fail_next(&self, url: impl Into<String>, error: CatalogError) {
        let mut guard = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        guard.entry(url.into()).or_default().push_back(error);
    }

    /// Every requested URL, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// How many times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CatalogError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        let queued = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(url)
            .and_then(|queue| queue.pop_front());
        if let Some(error) = queued {
            return Err(error);
        }

        let guard = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        guard.get(url).cloned().ok_or_else(|| CatalogError::Fetch {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// One row of a search results page fixture.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub title: String,
    /// Contributors as shown in the listing, e.g. `Max Pix (Illustrator)`
    pub authors: Vec<String>,
    pub href: String,
}

impl ResultRow {
    pub fn new(title: &str, authors: &[&str], href: &str) -> Self {
        Self {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            href: href.to_string(),
        }
    }
}

/// Build a search results page in the catalog's listing markup.
pub fn search_page_html(rows: &[ResultRow], summary: Option<&str>, next_href: Option<&str>) -> String {
    let mut html = String::from("<html><head><title>Search results</title></head><body>\n");

    if let Some(summary) = summary {
        html.push_str(&format!(
            "<h3 class=\"searchSubNavContainer\">{}</h3>\n",
            escape_html(summary)
        ));
    }

    html.push_str("<table class=\"tableList\">\n");
    for row in rows {
        let href = escape_html(&row.href);
        let title = escape_html(&row.title);

        html.push_str("<tr itemscope itemtype=\"http://schema.org/Book\">\n");
        html.push_str(&format!(
            "<td width=\"5%\"><a title=\"{title}\" href=\"{href}\"><img alt=\"{title}\" class=\"bookCover\" src=\"cover.jpg\"></a></td>\n"
        ));
        html.push_str(&format!(
            "<td width=\"100%\"><a class=\"bookTitle\" href=\"{href}\"><span itemprop=\"name\" role=\"heading\">{title}</span></a><br>\n<span class=\"by\">by</span>\n"
        ));

        let last = row.authors.len().saturating_sub(1);
        for (i, author) in row.authors.iter().enumerate() {
            let separator = if i < last { ", " } else { "" };
            html.push_str(&format!(
                "<div class=\"authorName__container\"><a class=\"authorName\" href=\"/author/show/{i}\"><span itemprop=\"name\">{}</span></a>{}</div>\n",
                escape_html(author),
                separator
            ));
        }
        html.push_str("</td>\n</tr>\n");
    }
    html.push_str("</table>\n");

    if let Some(next) = next_href {
        html.push_str(&format!(
            "<div><a class=\"next_page\" rel=\"next\" href=\"{}\">next »</a></div>\n",
            escape_html(next)
        ));
    }

    html.push_str("</body></html>\n");
    html
}

/// Content of a book detail page fixture.
#[derive(Debug, Clone, Default)]
pub struct BookPage {
    pub id: String,
    pub title: String,
    /// Contributor name and optional role, e.g. `("Max Pix", Some("Illustrator"))`
    pub contributors: Vec<(String, Option<String>)>,
    pub isbn: Option<String>,
    pub pages: Option<u32>,
    pub publication: Option<String>,
}

impl BookPage {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn contributor(mut self, name: &str, role: Option<&str>) -> Self {
        self.contributors
            .push((name.to_string(), role.map(|r| r.to_string())));
        self
    }

    pub fn isbn(mut self, isbn: &str) -> Self {
        self.isbn = Some(isbn.to_string());
        self
    }

    pub fn pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn publication(mut self, publication: &str) -> Self {
        self.publication = Some(publication.to_string());
        self
    }

    /// Render the page in the catalog's detail page markup.
    pub fn to_html(&self) -> String {
        let mut ld = serde_json::json!({
            "@context": "https://schema.org",
            "@type": "Book",
            "name": self.title,
            "author": self
                .contributors
                .iter()
                .map(|(name, _)| serde_json::json!({"@type": "Person", "name": name}))
                .collect::<Vec<_>>(),
        });
        if let Some(isbn) = &self.isbn {
            ld["isbn"] = serde_json::Value::from(isbn.as_str());
        }
        if let Some(pages) = self.pages {
            ld["numberOfPages"] = serde_json::Value::from(pages);
        }

        let title = escape_html(&self.title);
        let mut html = format!(
            "<html><head>\n<title>{title}</title>\n<link rel=\"canonical\" href=\"https://www.goodreads.com/book/show/{id}\">\n<script type=\"application/ld+json\">{ld}</script>\n</head><body>\n<div class=\"BookPage__mainContent\">\n<h1 class=\"Text Text__title1\" data-testid=\"bookTitle\" aria-label=\"Book title: {title}\">{title}</h1>\n<div class=\"ContributorLinksList\">\n",
            id = escape_html(&self.id),
        );

        for (i, (name, role)) in self.contributors.iter().enumerate() {
            let role = role
                .as_ref()
                .map(|r| {
                    format!(
                        "<span class=\"ContributorLink__role\" data-testid=\"role\">({})</span>",
                        escape_html(r)
                    )
                })
                .unwrap_or_default();
            html.push_str(&format!(
                "<span tabindex=\"-1\"><a class=\"ContributorLink\" href=\"/author/show/{i}\"><span class=\"ContributorLink__name\" data-testid=\"name\">{}</span>{role}</a></span>\n",
                escape_html(name)
            ));
        }
        html.push_str("</div>\n<div class=\"FeaturedDetails\">\n");

        if let Some(pages) = self.pages {
            html.push_str(&format!(
                "<p data-testid=\"pagesFormat\">{} pages, Paperback</p>\n",
                pages
            ));
        }
        if let Some(publication) = &self.publication {
            html.push_str(&format!(
                "<p data-testid=\"publicationInfo\">{}</p>\n",
                escape_html(publication)
            ));
        }

        html.push_str("</div>\n</div>\n</body></html>\n");
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
