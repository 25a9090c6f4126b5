use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitrina_feed::{FileStore, PersistedCache};

mod browse;
mod cache;

#[derive(Debug, Parser)]
#[command(name = "vitrina")]
#[command(about = "Browse and search spreadsheet-published product catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where to load the catalog from and how to print it.
#[derive(Debug, Args)]
struct SourceArgs {
    /// Catalog CSV URL; repeat for multi-sheet catalogs (defaults to `VITRINA_CATALOG_URLS`)
    #[arg(long = "url")]
    urls: Vec<String>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List categories and subcategories with product counts
    Categories {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Search the catalog by free text, or with NEW / SALE
    Search {
        query: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the models of one subcategory, grouped with their variants
    Models {
        /// Category name (case-insensitive)
        #[arg(long)]
        category: String,
        /// Subcategory name (defaults to "General")
        #[arg(long)]
        subcategory: Option<String>,
        /// Only show this product line
        #[arg(long)]
        line: Option<String>,
        /// Narrow by a search query first
        #[arg(long)]
        query: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Manage the persisted catalog cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// Remove cached catalogs
    Clear {
        /// Only remove the entry for this URL
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = vitrina_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("no command given; run `vitrina --help` for usage");
        return Ok(());
    };

    let store = FileStore::open(&config.cache_dir)?;
    let cache = Arc::new(PersistedCache::new(store));
    tracing::debug!(
        env = %config.env,
        cache_dir = %config.cache_dir.display(),
        "vitrina starting"
    );

    match command {
        Commands::Categories { source } => {
            browse::run_categories(&config, &cache, &source.urls, source.json).await
        }
        Commands::Search { query, source } => {
            browse::run_search(&config, &cache, &source.urls, &query, source.json).await
        }
        Commands::Models {
            category,
            subcategory,
            line,
            query,
            source,
        } => {
            let selection = browse::ModelSelection {
                category: &category,
                subcategory: subcategory.as_deref(),
                line: line.as_deref(),
                query: query.as_deref().unwrap_or(""),
            };
            browse::run_models(&config, &cache, &source.urls, &selection, source.json).await
        }
        Commands::Cache {
            command: CacheCommands::Clear { url },
        } => {
            cache::run_cache_clear(&cache, url.as_deref());
            Ok(())
        }
    }
}
