//! Catalog URL conventions.

use url::{form_urlencoded, Url};

use crate::utils::{clean_author_for_query, clean_title_for_query};

/// Base URL of the catalog front page.
pub const DEFAULT_BASE_URL: &str = "https://www.goodreads.com";

/// Builds search, detail and absolute URLs from a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUrls {
    home: String,
}

impl CatalogUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let home = base_url.into().trim_end_matches('/').to_string();
        Self { home }
    }

    /// The catalog front page, without trailing slash.
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Detail page URL for a catalog ID.
    pub fn book(&self, id: &str) -> String {
        format!("{}/book/show/{}", self.home, id)
    }

    /// Search URL for a title and an optional author.
    ///
    /// Both are cleaned first. With an author, title and author form a single
    /// free-text query; without one, the search is restricted to titles.
    pub fn search(&self, title: &str, author: Option<&str>) -> String {
        let mut text = clean_title_for_query(title);
        if let Some(author) = author {
            text.push(' ');
            text.push_str(&clean_author_for_query(author));
        }

        let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
        let url = format!("{}/search?&search_type=books&q={}", self.home, encoded);

        match author {
            Some(_) => url,
            None => format!("{}&search%5Bfield%5D=title", url),
        }
    }

    /// Resolve a link found on a catalog page into an absolute URL.
    pub fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }

        match Url::parse(&self.home).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/{}", self.home, href.trim_start_matches('/')),
        }
    }

    /// Absolute detail URL from a result link, with its query string dropped.
    pub fn detail(&self, href: &str) -> String {
        let path = href.split('?').next().unwrap_or(href);
        self.absolute(path)
    }
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_url() {
        let urls = CatalogUrls::default();
        assert_eq!(urls.book("41940388"), "https://www.goodreads.com/book/show/41940388");
    }

    #[test]
    fn test_search_url_title_only() {
        let urls = CatalogUrls::default();
        assert_eq!(
            urls.search("Waking Gods (Themis Files, #2)", None),
            "https://www.goodreads.com/search?&search_type=books&q=waking+gods&search%5Bfield%5D=title"
        );
    }

    #[test]
    fn test_search_url_with_author() {
        let urls = CatalogUrls::new("http://127.0.0.1:1234/");
        assert_eq!(
            urls.search("Lilo & Stitch: the movie", Some("Irvin D. Yalom")),
            "http://127.0.0.1:1234/search?&search_type=books&q=lilo+and+stitch+the+movie+Irvin+Yalom"
        );
    }

    #[test]
    fn test_search_url_percent_encodes() {
        let urls = CatalogUrls::default();
        let url = urls.search("la clé de salomon", None);
        assert!(url.contains("q=la+cl%C3%A9+de+salomon&"), "{}", url);
    }

    #[test]
    fn test_detail_url_strips_query() {
        let urls = CatalogUrls::default();
        assert_eq!(
            urls.detail("/book/show/52757776-substance?from_search=true&qid=abc"),
            "https://www.goodreads.com/book/show/52757776-substance"
        );
        assert_eq!(
            urls.detail("https://example.org/book/show/1?x=1"),
            "https://example.org/book/show/1"
        );
    }

    #[test]
    fn test_absolute_keeps_query() {
        let urls = CatalogUrls::default();
        assert_eq!(
            urls.absolute("/search?page=2&q=how+time+war"),
            "https://www.goodreads.com/search?page=2&q=how+time+war"
        );
    }
}
