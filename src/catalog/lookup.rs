//! Finding the search result that corresponds to a query.

use super::pagination::PaginatedResults;
use super::{Catalog, CatalogError};
use crate::models::{literal_string, SearchQuery, SearchResult};
use crate::utils::{fuzzy_compare, remove_initials};

/// Which matching pass accepted a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    /// The whole candidate title matched
    Exact,
    /// The candidate title matched once its subtitle (after `:`) was dropped
    WithoutSubtitle,
}

/// A search for one [`SearchQuery`] against a [`Catalog`].
///
/// The search URL is computed once, from the cleaned title and, when the
/// query says so, the cleaned author.
#[derive(Debug, Clone)]
pub struct Lookup<'a> {
    catalog: &'a Catalog,
    query: SearchQuery,
    search_url: String,
}

impl<'a> Lookup<'a> {
    pub fn new(catalog: &'a Catalog, query: SearchQuery) -> Self {
        let search_url = catalog.urls().search(query.title(), query.search_author());
        Self {
            catalog,
            query,
            search_url,
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Results of the first search page (at most 20).
    pub async fn matches(&self) -> Result<Vec<SearchResult>, CatalogError> {
        self.catalog
            .fetch_page(&self.search_url)
            .await?
            .ok_or_else(|| CatalogError::MissingElement(format!("No match found for {}", self)))
    }

    /// All results, page by page.
    pub async fn matches_paginated(&self) -> Result<PaginatedResults, CatalogError> {
        self.catalog.paginate(&self.search_url).await
    }

    /// The first result of the first page matching both title and author.
    ///
    /// Only the first page is considered. Titles must match exactly (modulo
    /// case, diacritics, symbols and spacing), so a second pass retries with
    /// result subtitles dropped. The author, when given, must appear in the
    /// result's authors.
    pub async fn find_best_match(&self) -> Result<SearchResult, CatalogError> {
        let results = self.matches().await?;

        match self.best_match_among(&results) {
            Some((pass, result)) => {
                tracing::debug!("{} matched {} ({:?})", self.query, result.url, pass);
                Ok(result.clone())
            }
            None => Err(CatalogError::NotFound(format!(
                "Could not find a book matching {}",
                self
            ))),
        }
    }

    /// Pick the best match among already fetched results.
    pub fn best_match_among<'r>(
        &self,
        results: &'r [SearchResult],
    ) -> Option<(MatchPass, &'r SearchResult)> {
        let author = self.query.author();

        let exact = results
            .iter()
            .find(|r| titles_match(self.query.title(), &r.title) && authors_match(author, &r.authors));
        if let Some(result) = exact {
            return Some((MatchPass::Exact, result));
        }

        results
            .iter()
            .find(|r| {
                let main_title = r.title.split(':').next().unwrap_or_default();
                titles_match(self.query.title(), main_title) && authors_match(author, &r.authors)
            })
            .map(|result| (MatchPass::WithoutSubtitle, result))
    }

    /// Print this lookup as a Rust expression.
    pub fn to_literal(&self) -> String {
        let query = self.query.to_literal().replace('\n', "\n    ");
        format!(
            "Lookup {{\n    query: {},\n    search_url: {},\n}}\n",
            query.trim_end(),
            literal_string(&self.search_url),
        )
    }
}

impl std::fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lookup(query={}, search_url={})", self.query, self.search_url)
    }
}

fn titles_match(expected: &str, candidate: &str) -> bool {
    fuzzy_compare(expected, candidate, true)
}

fn authors_match(expected: Option<&str>, candidates: &[String]) -> bool {
    match expected {
        None => true,
        Some(expected) => fuzzy_compare(
            &remove_initials(expected),
            &remove_initials(&candidates.join(" ")),
            false,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::{search_page_html, ResultRow, StaticFetcher};
    use std::sync::Arc;

    fn result(title: &str, authors: &str) -> SearchResult {
        SearchResult::new(title, vec![authors.to_string()], format!("@{}", title))
    }

    fn candidates() -> Vec<SearchResult> {
        vec![
            result("simple title: with a subtitle", "The Author"),
            result("simple title", "The Author"),
            result("other title", "Other Author"),
            result("SOME TITLE   With !àccents!", "Space Authôr"),
            result("Multiple Authors", "Author One, Author Two, Author Three"),
            result("Another: with subtitle", "The Author"),
        ]
    }

    fn best<'r>(
        catalog: &Catalog,
        query: SearchQuery,
        results: &'r [SearchResult],
    ) -> Option<(MatchPass, &'r SearchResult)> {
        catalog.lookup(query).best_match_among(results)
    }

    #[test]
    fn test_best_match_exact_and_fuzzy() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let results = candidates();
        let q = |title: &str, author: Option<&str>| SearchQuery::new(title).with_optional_author(author);

        let cases = [
            (q("simple title with a subtitle", Some("The Author")), 0),
            (q("simple title", Some("The Author")), 1),
            (q("simple title", None), 1),
            (q("  !! SIMPLé TITLE  !!", Some("thE K. authoR, ")), 1),
            (q("some title with !accents!", Some("space author")), 3),
            (q("multiple authors", Some("author One")), 4),
            (q("multiple authors", Some("author Two")), 4),
            (q("multiple authors", Some("author Three")), 4),
        ];

        for (query, expected) in cases {
            let label = query.to_string();
            let (pass, found) = best(&catalog, query, &results).unwrap_or_else(|| panic!("{}", label));
            assert_eq!(found, &results[expected], "{}", label);
            assert_eq!(pass, MatchPass::Exact, "{}", label);
        }
    }

    #[test]
    fn test_best_match_without_subtitle() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let results = candidates();

        for query in [
            SearchQuery::new("another"),
            SearchQuery::new("another").with_author("the author"),
        ] {
            let (pass, found) = best(&catalog, query, &results).unwrap();
            assert_eq!(found, &results[5]);
            assert_eq!(pass, MatchPass::WithoutSubtitle);
        }
    }

    #[test]
    fn test_exact_pass_wins_over_earlier_subtitle_match() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let results = vec![
            result("Dune: Deluxe Edition", "Frank Herbert"),
            result("Dune", "Frank Herbert"),
        ];
        let (pass, found) = best(&catalog, SearchQuery::new("dune"), &results).unwrap();
        assert_eq!(found, &results[1]);
        assert_eq!(pass, MatchPass::Exact);
    }

    #[test]
    fn test_no_match() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let results = candidates();

        for title in ["doesnt exist", "simple title with another subtitle", ""] {
            assert!(best(&catalog, SearchQuery::new(title), &results).is_none(), "{:?}", title);
        }

        let wrong_author = SearchQuery::new("simple title").with_author("Another Author");
        assert!(best(&catalog, wrong_author, &results).is_none());
        assert!(best(&catalog, SearchQuery::new("simple title"), &[]).is_none());
    }

    #[test]
    fn test_search_url_follows_author_flag() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));

        let with_author = catalog.lookup(SearchQuery::new("Substance").with_author("Claro"));
        assert!(with_author.search_url().ends_with("q=substance+Claro"));

        let title_only =
            catalog.lookup(SearchQuery::new("Substance").with_author("Claro").author_in_search(false));
        assert!(title_only.search_url().ends_with("q=substance&search%5Bfield%5D=title"));
    }

    #[tokio::test]
    async fn test_find_best_match_fetches_first_page_only() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let lookup = catalog.lookup(SearchQuery::new("simple title").with_author("The Author"));
        let url = lookup.search_url().to_string();

        let fetcher = Arc::new(StaticFetcher::new().with_page(
            url.clone(),
            search_page_html(
                &[
                    ResultRow::new("Unrelated", &["Nobody"], "/book/show/1-unrelated"),
                    ResultRow::new("Simple Title (Series, #1)", &["The Author (Goodreads Author)"], "/book/show/2-simple?from_search=true"),
                ],
                Some("Page 1 of about 60 results"),
                Some("/search?page=2"),
            ),
        ));
        let catalog = Catalog::new(fetcher.clone());
        let lookup = catalog.lookup(SearchQuery::new("simple title").with_author("The Author"));

        let found = lookup.find_best_match().await.unwrap();
        assert_eq!(found.title, "Simple Title");
        assert_eq!(found.authors, vec!["The Author"]);
        assert_eq!(found.url, "https://www.goodreads.com/book/show/2-simple");
        assert_eq!(fetcher.requests(), vec![url]);
    }

    #[tokio::test]
    async fn test_find_best_match_errors() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let url = catalog.lookup(SearchQuery::new("nothing")).search_url().to_string();

        let fetcher = StaticFetcher::new().with_page(
            url.clone(),
            search_page_html(&[ResultRow::new("Something", &["Else"], "/book/show/1")], None, None),
        );
        let catalog = Catalog::new(Arc::new(fetcher));
        let err = catalog
            .lookup(SearchQuery::new("nothing"))
            .find_best_match()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(ref msg) if msg.contains("nothing")));

        let fetcher = StaticFetcher::new().with_page(url, "<html><body>Looking for a book?</body></html>");
        let catalog = Catalog::new(Arc::new(fetcher));
        let err = catalog
            .lookup(SearchQuery::new("nothing"))
            .find_best_match()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingElement(ref msg) if msg.contains("No match found")));
    }

    #[test]
    fn test_to_literal() {
        let catalog = Catalog::new(Arc::new(StaticFetcher::new()));
        let lookup = catalog.lookup(SearchQuery::new("Dune"));
        assert_eq!(
            lookup.to_literal(),
            "Lookup {\n    query: SearchQuery {\n        title: \"Dune\".to_string(),\n        author: None,\n        include_author_in_search: false,\n    },\n    search_url: \"https://www.goodreads.com/search?&search_type=books&q=dune&search%5Bfield%5D=title\".to_string(),\n}\n"
        );
    }
}
