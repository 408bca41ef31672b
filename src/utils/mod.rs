//! Utility modules supporting catalog lookups.
//!
//! - [`clean_title_for_query`], [`clean_author_for_query`], [`remove_diacritics`],
//!   [`remove_initials`]: pure text normalization
//! - [`fuzzy_compare`]: case, accent and symbol insensitive comparison
//! - [`Retry`] and [`RetryConfiguration`]: bounded retry with exponential backoff
//! - [`HttpClient`]: HTTP client implementing [`DocumentFetcher`](crate::catalog::DocumentFetcher)
//!
//! # Fuzzy comparison
//!
//! ```rust
//! use goodreads_metafetch::utils::fuzzy_compare;
//!
//! assert!(fuzzy_compare("  !! SIMPLé TITLE  !!", "Simple Title", true));
//! assert!(fuzzy_compare("prefix", "prefix suffix", false));
//! assert!(!fuzzy_compare("prefix", "prefix suffix", true));
//! ```
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use goodreads_metafetch::catalog::{Catalog, CatalogError};
//! use goodreads_metafetch::models::{Metadata, SearchQuery};
//! use goodreads_metafetch::utils::{Retry, RetryConfiguration};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), CatalogError> {
//! let catalog = Catalog::from_config(&goodreads_metafetch::config::get_config())?;
//! let retry = Retry::new(RetryConfiguration::EXPONENTIAL);
//! let metadata = retry
//!     .run(|| Metadata::lookup(&catalog, SearchQuery::new("Freakonomics")))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod fuzzy;
mod http;
mod retry;
mod text;

pub use fuzzy::{fuzzy_compare, fuzzy_normalize};
pub use http::HttpClient;
pub use retry::{retry_if_server_fault, Retry, RetryConfiguration};
pub use text::{
    clean_author_for_query, clean_title_for_query, remove_content_in_parentheses,
    remove_diacritics, remove_initials, remove_separators, replace_special_chars, trim_spaces,
};
