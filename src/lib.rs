//! # Goodreads Metafetch
//!
//! Resolve a loosely specified book query (title, optional author) against the
//! Goodreads search pages, pick the best matching result, and extract a
//! structured [`Metadata`] record from its detail page.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (SearchQuery, SearchResult, Metadata)
//! - [`catalog`]: Catalog client, search pages, pagination, matching and detail extraction
//! - [`utils`]: Text normalization, fuzzy comparison, retry with backoff, HTTP client
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use goodreads_metafetch::catalog::Catalog;
//! use goodreads_metafetch::models::{Metadata, SearchQuery};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_config(&goodreads_metafetch::config::get_config())?;
//! let query = SearchQuery::new("House of Leaves").with_author("Mark Danielewski");
//! let metadata = Metadata::lookup(&catalog, query).await?;
//! println!("{}", metadata.to_literal());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, DocumentFetcher};
pub use models::{Metadata, SearchQuery, SearchResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
