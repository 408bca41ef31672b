//! Core data models for book queries, search results and metadata.

mod book;
mod query;

pub use book::{Metadata, SearchResult};
pub use query::SearchQuery;

/// Render a string as a Rust `String` literal expression.
pub(crate) fn literal_string(value: &str) -> String {
    format!("{:?}.to_string()", value)
}

/// Render an optional string as a Rust `Option<String>` literal expression.
pub(crate) fn literal_option_string(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("Some({})", literal_string(v)),
        None => "None".to_string(),
    }
}

/// Render a list of strings as a Rust `vec![...]` literal expression.
pub(crate) fn literal_vec(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| literal_string(v)).collect();
    format!("vec![{}]", items.join(", "))
}
