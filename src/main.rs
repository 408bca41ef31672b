use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use goodreads_metafetch::catalog::{Catalog, PaginatedResults};
use goodreads_metafetch::config::{get_config, load_config, Config};
use goodreads_metafetch::models::{Metadata, SearchQuery, SearchResult};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Metafetch - Fetch book metadata from Goodreads
#[derive(Parser, Debug)]
#[command(name = "metafetch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find a book on Goodreads and print its metadata", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Plain)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Retry fetches that fail with a server error
    #[arg(long, global = true)]
    retry: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Plain text (human-readable)
    Plain,
    /// JSON format (machine-readable)
    Json,
    /// Rust struct literal
    Literal,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the best match for a title and print its metadata
    #[command(alias = "l")]
    Lookup {
        /// Book title
        title: String,

        /// Author(s), "FirstName LastName"
        #[arg(long, short)]
        author: Option<String>,

        /// Only use the author to filter results, search in titles only
        #[arg(long, requires = "author")]
        title_only: bool,
    },

    /// List search results
    #[command(alias = "s")]
    Search {
        /// Book title
        title: String,

        /// Author(s), "FirstName LastName"
        #[arg(long, short)]
        author: Option<String>,

        /// Only use the author to filter results, search in titles only
        #[arg(long, requires = "author")]
        title_only: bool,

        /// Follow the listing through all its pages
        #[arg(long)]
        all_pages: bool,

        /// Stop after this many pages (with --all-pages)
        #[arg(long, requires = "all_pages")]
        max_pages: Option<u32>,
    },

    /// Print the metadata of a book from its Goodreads ID or URL
    Show {
        /// Goodreads ID (e.g. 41940388) or detail page URL
        book: String,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("goodreads_metafetch={},metafetch={}", env_filter, env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => get_config(),
    };
    if cli.retry {
        config.retry.enabled = true;
    }

    match cli.command {
        Commands::Lookup {
            title,
            author,
            title_only,
        } => {
            let catalog = build_catalog(&config)?;
            let query = build_query(title, author, title_only);
            tracing::info!("Looking up {}", query);

            let metadata = Metadata::lookup(&catalog, query).await?;
            output_metadata(&metadata, cli.output)?;
        }

        Commands::Search {
            title,
            author,
            title_only,
            all_pages,
            max_pages,
        } => {
            let catalog = build_catalog(&config)?;
            let lookup = catalog.lookup(build_query(title, author, title_only));
            tracing::debug!("Search URL: {}", lookup.search_url());

            let results = if all_pages {
                let mut pages = lookup.matches_paginated().await?;
                if !cli.quiet {
                    eprintln!(
                        "{} results over {} pages",
                        pages.total_results(),
                        pages.total_pages()
                    );
                }
                collect_pages(&mut pages, max_pages).await?
            } else {
                lookup.matches().await?
            };

            output_results(&results, cli.output)?;
        }

        Commands::Show { book } => {
            let catalog = build_catalog(&config)?;
            let metadata = if book.starts_with("http://") || book.starts_with("https://") {
                Metadata::from_url(&catalog, &book).await?
            } else {
                Metadata::from_id(&catalog, book.trim()).await?
            };
            output_metadata(&metadata, cli.output)?;
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn build_catalog(config: &Config) -> Result<Catalog> {
    Catalog::from_config(config).context("Failed to create catalog client")
}

fn build_query(title: String, author: Option<String>, title_only: bool) -> SearchQuery {
    SearchQuery::new(title)
        .with_optional_author(author)
        .author_in_search(!title_only)
}

async fn collect_pages(pages: &mut PaginatedResults, max_pages: Option<u32>) -> Result<Vec<SearchResult>> {
    let limit = max_pages.unwrap_or(u32::MAX);

    while pages.has_next() && pages.current_page() < limit {
        let page = pages.next().await?;
        tracing::info!(
            "Page {}/{}: {} results",
            pages.current_page(),
            pages.total_pages(),
            page.len()
        );
    }

    Ok(pages.results())
}

fn output_metadata(metadata: &Metadata, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(metadata)?),
        OutputFormat::Literal => print!("{}", metadata.to_literal()),
        OutputFormat::Plain => {
            println!("Title:     {}", metadata.title);
            println!("Authors:   {}", metadata.authors_str());
            println!("ID:        {}", metadata.id);
            println!("URL:       {}", metadata.url);
            println!("ISBN:      {}", metadata.isbn.as_deref().unwrap_or("-"));
            println!(
                "Pages:     {}",
                metadata.pages.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
            );
            println!(
                "Published: {}",
                metadata
                    .pub_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }
    Ok(())
}

fn output_results(results: &[SearchResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(results)?),
        OutputFormat::Literal => {
            for result in results {
                print!("{}", result.to_literal());
            }
        }
        OutputFormat::Plain => {
            if results.is_empty() {
                println!("No results found.");
            }
            for (i, result) in results.iter().enumerate() {
                println!("{:>3}. {} by {}", i + 1, result.title, result.authors_str());
                println!("     {}", result.url);
            }
        }
    }
    Ok(())
}
