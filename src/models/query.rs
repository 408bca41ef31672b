//! Book search query.

use serde::{Deserialize, Serialize};

use super::{literal_option_string, literal_string};

/// What the caller is looking for: a title, and optionally an author.
///
/// Built by value and never mutated afterwards; the catalog derives the search
/// URL from it once, when a [`Lookup`](crate::catalog::Lookup) is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    title: String,
    author: Option<String>,
    include_author_in_search: bool,
}

impl SearchQuery {
    /// Query by title only. The search is restricted to the title field.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            include_author_in_search: false,
        }
    }

    /// Add an author. By default the author also becomes part of the search text.
    ///
    /// Multiple authors can be separated by spaces, `,`, `;` or `&`. For matching,
    /// the author should at least contain the first author as "FirstName LastName".
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self.include_author_in_search = true;
        self
    }

    /// Set the author only if one is given.
    pub fn with_optional_author(self, author: Option<impl Into<String>>) -> Self {
        match author {
            Some(author) => self.with_author(author),
            None => self,
        }
    }

    /// Whether the author is sent to the catalog (search all fields) or only used
    /// to filter results (search in titles only).
    ///
    /// Except for very generic titles, a title-only search usually gives better results.
    /// Has no effect when no author is set.
    pub fn author_in_search(mut self, include: bool) -> Self {
        self.include_author_in_search = include && self.author.is_some();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn include_author_in_search(&self) -> bool {
        self.include_author_in_search
    }

    /// The author to put in the search text, if any.
    pub fn search_author(&self) -> Option<&str> {
        if self.include_author_in_search {
            self.author()
        } else {
            None
        }
    }

    /// Print this query as a Rust expression that rebuilds it.
    pub fn to_literal(&self) -> String {
        format!(
            "SearchQuery {{\n    title: {},\n    author: {},\n    include_author_in_search: {},\n}}\n",
            literal_string(&self.title),
            literal_option_string(self.author()),
            self.include_author_in_search,
        )
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.author {
            Some(author) => write!(f, "\"{}\" by \"{}\"", self.title, author),
            None => write!(f, "\"{}\"", self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_only_query() {
        let query = SearchQuery::new("Freakonomics");
        assert_eq!(query.title(), "Freakonomics");
        assert_eq!(query.author(), None);
        assert!(!query.include_author_in_search());
        assert_eq!(query.search_author(), None);
    }

    #[test]
    fn test_author_included_by_default() {
        let query = SearchQuery::new("substance").with_author("claro");
        assert!(query.include_author_in_search());
        assert_eq!(query.search_author(), Some("claro"));

        let query = query.author_in_search(false);
        assert_eq!(query.author(), Some("claro"));
        assert_eq!(query.search_author(), None);
    }

    #[test]
    fn test_author_in_search_requires_author() {
        let query = SearchQuery::new("title").author_in_search(true);
        assert!(!query.include_author_in_search());
    }

    #[test]
    fn test_to_literal() {
        let query = SearchQuery::new("House \"of\" Leaves").with_author("Mark Danielewski");
        let literal = query.to_literal();
        assert!(literal.starts_with("SearchQuery {\n"));
        assert!(literal.contains(r#"title: "House \"of\" Leaves".to_string(),"#));
        assert!(literal.contains(r#"author: Some("Mark Danielewski".to_string()),"#));
        assert!(literal.contains("include_author_in_search: true,"));
    }
}
