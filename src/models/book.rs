//! Search results and book metadata records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{literal_option_string, literal_string, literal_vec};

/// One row of a catalog search results listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title as shown in the listing, without the series marker
    pub title: String,

    /// Main authors (illustrators, translators, etc. excluded)
    pub authors: Vec<String>,

    /// Absolute URL of the book detail page, without query string
    pub url: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, authors: Vec<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors,
            url: url.into(),
        }
    }

    /// Authors joined with ", "
    pub fn authors_str(&self) -> String {
        self.authors.join(", ")
    }

    /// Print this result as a Rust expression that rebuilds it.
    pub fn to_literal(&self) -> String {
        format!(
            "SearchResult {{\n    title: {},\n    authors: {},\n    url: {},\n}}\n",
            literal_string(&self.title),
            literal_vec(&self.authors),
            literal_string(&self.url),
        )
    }
}

/// Book metadata extracted from a catalog detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The complete title, as found on the detail page
    pub title: String,

    /// Main authors, excluding editors, illustrators, translators...
    pub authors: Vec<String>,

    /// URL of the detail page
    pub url: String,

    /// Catalog ID of the book
    pub id: String,

    /// ISBN of the edition shown on the detail page (ISBN-13 preferred)
    pub isbn: Option<String>,

    /// Number of pages of the edition shown on the detail page
    pub pages: Option<u32>,

    /// Earliest publication date. Missing month and day default to January 1st.
    pub pub_date: Option<NaiveDate>,
}

impl Metadata {
    /// Authors joined with ", "
    pub fn authors_str(&self) -> String {
        self.authors.join(", ")
    }

    /// Print this record as a Rust expression that rebuilds it.
    ///
    /// The field list is maintained by hand and must follow the struct definition.
    pub fn to_literal(&self) -> String {
        let pages = match self.pages {
            Some(pages) => format!("Some({})", pages),
            None => "None".to_string(),
        };
        let pub_date = match self.pub_date {
            Some(date) => format!(
                "NaiveDate::from_ymd_opt({}, {}, {})",
                date.year(),
                date.month(),
                date.day()
            ),
            None => "None".to_string(),
        };

        let fields = [
            ("title", literal_string(&self.title)),
            ("authors", literal_vec(&self.authors)),
            ("url", literal_string(&self.url)),
            ("id", literal_string(&self.id)),
            ("isbn", literal_option_string(self.isbn.as_deref())),
            ("pages", pages),
            ("pub_date", pub_date),
        ];

        let mut out = String::from("Metadata {\n");
        for (name, value) in fields {
            out.push_str(&format!("    {}: {},\n", name, value));
        }
        out.push_str("}\n");
        out
    }
}
