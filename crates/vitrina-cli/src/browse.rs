//! Read-only catalog commands: `categories`, `search` and `models`.
//!
//! Each command loads the catalog through the persisted cache, waits for any
//! background refresh so the cache is current when the process exits, then
//! prints text or JSON.

use std::sync::Arc;

use vitrina_core::{AppConfig, PhotoSource, Product};
use vitrina_feed::{CatalogSources, CsvClient, FileStore, LoadErrorKind, PersistedCache};
use vitrina_index::{group_by_model, Catalog, Category, ModelGroup, DEFAULT_SUBCATEGORY};

/// Which slice of the catalog `models` prints.
#[derive(Debug)]
pub(crate) struct ModelSelection<'a> {
    pub category: &'a str,
    pub subcategory: Option<&'a str>,
    pub line: Option<&'a str>,
    pub query: &'a str,
}

/// User-facing message for a failed load.
fn describe_load_error(kind: LoadErrorKind) -> &'static str {
    match kind {
        LoadErrorKind::InvalidUrl => "the catalog URL is missing or invalid",
        LoadErrorKind::Network => {
            "the catalog could not be downloaded and no cached copy exists"
        }
        LoadErrorKind::CsvStructure => "the catalog CSV is malformed",
        LoadErrorKind::Normalization => "the catalog rows could not be read",
    }
}

/// Picks the URLs given on the command line, falling back to config.
fn resolve_urls<'a>(config: &'a AppConfig, urls: &'a [String]) -> anyhow::Result<&'a [String]> {
    let urls = if urls.is_empty() {
        config.catalog_urls.as_slice()
    } else {
        urls
    };
    if urls.is_empty() {
        anyhow::bail!("no catalog URL given; pass --url or set VITRINA_CATALOG_URLS");
    }
    Ok(urls)
}

/// Loads every source into a [`Catalog`].
///
/// # Errors
///
/// Returns an error if no URL is configured, the HTTP client cannot be
/// built, or every source failed and nothing was loaded.
async fn load_catalog(
    config: &AppConfig,
    cache: &Arc<PersistedCache<FileStore>>,
    urls: &[String],
) -> anyhow::Result<Catalog> {
    let urls = resolve_urls(config, urls)?;
    let client = CsvClient::from_config(config)?;
    let sources = CatalogSources::new(&client, cache, urls);

    sources.load_sources().await;
    sources.settle().await;
    let state = sources.snapshot().await;

    if let Some(kind) = state.error {
        if state.products.is_empty() {
            anyhow::bail!("{} ({kind})", describe_load_error(kind));
        }
        tracing::warn!(
            kind = %kind,
            "some catalog sources failed to load: {}",
            describe_load_error(kind)
        );
    }

    tracing::info!(
        sources = urls.len(),
        products = state.products.len(),
        "catalog loaded"
    );
    Ok(Catalog::new(
        state.products.iter().cloned(),
        config.search_cache_capacity,
    ))
}

/// Print the category tree with counts.
///
/// # Errors
///
/// See [`load_catalog`].
pub(crate) async fn run_categories(
    config: &AppConfig,
    cache: &Arc<PersistedCache<FileStore>>,
    urls: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(config, cache, urls).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.categories())?);
    } else {
        for line in render_tree(catalog.categories(), false) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Print the part of the tree matching `query`, down to products.
///
/// # Errors
///
/// See [`load_catalog`].
pub(crate) async fn run_search(
    config: &AppConfig,
    cache: &Arc<PersistedCache<FileStore>>,
    urls: &[String],
    query: &str,
    json: bool,
) -> anyhow::Result<()> {
    let mut catalog = load_catalog(config, cache, urls).await?;
    let result = catalog.search(query);
    if json {
        println!("{}", serde_json::to_string_pretty(&*result)?);
    } else if result.is_empty() {
        println!("no products match \"{}\"", query.trim());
    } else {
        for line in render_tree(&result, true) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Print the model groups of one subcategory.
///
/// # Errors
///
/// See [`load_catalog`]. Also fails if the category or subcategory does not
/// exist in the (optionally query-narrowed) catalog.
pub(crate) async fn run_models(
    config: &AppConfig,
    cache: &Arc<PersistedCache<FileStore>>,
    urls: &[String],
    selection: &ModelSelection<'_>,
    json: bool,
) -> anyhow::Result<()> {
    let mut catalog = load_catalog(config, cache, urls).await?;
    let avatars = catalog.avatars_by_model();
    let tree = catalog.search(selection.query);

    let products = select_products(&tree, selection)?;
    let groups = group_by_model(&products, Some(&avatars));

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else if groups.is_empty() {
        println!("no visible products");
    } else {
        for line in render_groups(&groups) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Resolves `selection` against `tree` to the products it names.
fn select_products(
    tree: &[Category],
    selection: &ModelSelection<'_>,
) -> anyhow::Result<Vec<Arc<Product>>> {
    let category_name = selection.category.trim().to_uppercase();
    let category = tree
        .iter()
        .find(|c| c.name == category_name)
        .ok_or_else(|| anyhow::anyhow!("category '{}' not found", selection.category.trim()))?;

    let subcategory_name = selection.subcategory.unwrap_or(DEFAULT_SUBCATEGORY);
    let subcategory = category.subcategory(subcategory_name).ok_or_else(|| {
        anyhow::anyhow!(
            "subcategory '{}' not found in '{}'",
            subcategory_name.trim(),
            category.name
        )
    })?;

    let line = selection.line.map(|l| l.trim().to_uppercase());
    Ok(subcategory
        .products
        .iter()
        .filter(|p| line.as_deref().is_none_or(|l| p.line.trim() == l))
        .cloned()
        .collect())
}

fn render_tree(tree: &[Category], with_products: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for category in tree {
        lines.push(format!("{} ({})", category.name, category.total_product_count));
        for sub in &category.subcategories {
            let heading = format!("  {} ({})", sub.name, sub.products.len());
            if sub.lines.is_empty() {
                lines.push(heading);
            } else {
                lines.push(format!("{heading}  lines: {}", sub.lines.join(", ")));
            }
            if with_products {
                lines.extend(
                    sub.products
                        .iter()
                        .map(|p| format!("    - {}", describe_variant(p))),
                );
            }
        }
    }
    lines
}

fn render_groups(groups: &[ModelGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        let plural = if group.variants.len() == 1 { "" } else { "s" };
        let heading = format!("{} ({} variant{plural})", group.model, group.variants.len());
        match &group.avatar {
            Some(avatar) => lines.push(format!("{heading}  avatar: {avatar}")),
            None => lines.push(heading),
        }
        for variant in &group.variants {
            lines.push(format!("  - {}", describe_variant(variant)));
            match variant.photo_source() {
                PhotoSource::None => {}
                PhotoSource::External(url) => lines.push(format!("    album: {url}")),
                PhotoSource::Gallery(urls) => lines.push(format!("    photos: {}", urls.len())),
            }
        }
    }
    lines
}

/// One-line summary of a variant: model, details, label and price.
fn describe_variant(product: &Product) -> String {
    let details: Vec<&str> = [
        product.model.as_str(),
        product.version.as_str(),
        product.capacity.as_str(),
        product.color.as_str(),
        product.condition.as_str(),
        product.battery.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();

    let label = if product.label.is_empty() {
        String::new()
    } else {
        format!(" [{}]", product.label)
    };
    let price = if product.price.is_empty() {
        "consultar"
    } else {
        product.price.as_str()
    };
    format!("{}{label} | {price}", details.join(" · "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_index::build_hierarchy;

    fn product(subcategory: &str, line: &str, model: &str, price: &str) -> Arc<Product> {
        Arc::new(Product {
            category: "CELULARES".to_owned(),
            subcategory: subcategory.to_owned(),
            line: line.to_owned(),
            model: model.to_owned(),
            price: price.to_owned(),
            ..Product::default()
        })
    }

    fn tree() -> Vec<Category> {
        build_hierarchy(&[
            product("APPLE", "IPHONE 15", "iPhone 15", "USD 999"),
            product("APPLE", "IPHONE 13", "iPhone 13", ""),
            product("", "", "Cargador", "USD 20"),
        ])
    }

    fn selection<'a>(
        category: &'a str,
        subcategory: Option<&'a str>,
        line: Option<&'a str>,
    ) -> ModelSelection<'a> {
        ModelSelection {
            category,
            subcategory,
            line,
            query: "",
        }
    }

    #[test]
    fn resolve_urls_prefers_command_line() {
        let config = test_config(vec!["https://config/a".to_owned()]);
        let cli = vec!["https://cli/a".to_owned()];
        assert_eq!(resolve_urls(&config, &cli).unwrap(), cli.as_slice());
        assert_eq!(
            resolve_urls(&config, &[]).unwrap(),
            config.catalog_urls.as_slice()
        );
    }

    #[test]
    fn resolve_urls_requires_some_url() {
        let config = test_config(Vec::new());
        assert!(resolve_urls(&config, &[]).is_err());
    }

    #[test]
    fn select_products_defaults_to_general() {
        let tree = tree();
        let products = select_products(&tree, &selection("celulares", None, None)).unwrap();
        let models: Vec<&str> = products.iter().map(|p| p.model.as_str()).collect();
        assert_eq!(models, vec!["Cargador"]);
    }

    #[test]
    fn select_products_filters_by_line() {
        let tree = tree();
        let wanted = selection("CELULARES", Some("apple"), Some(" iphone 13 "));
        let products = select_products(&tree, &wanted).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].model, "iPhone 13");
    }

    #[test]
    fn select_products_reports_unknown_names() {
        let tree = tree();
        assert!(select_products(&tree, &selection("AUDIO", None, None)).is_err());
        assert!(select_products(&tree, &selection("CELULARES", Some("SAMSUNG"), None)).is_err());
    }

    #[test]
    fn render_tree_lists_counts_and_lines() {
        let lines = render_tree(&tree(), false);
        assert_eq!(
            lines,
            vec![
                "CELULARES (3)",
                "  APPLE (2)  lines: IPHONE 15, IPHONE 13",
                "  General (1)",
            ]
        );
    }

    #[test]
    fn describe_variant_marks_missing_price() {
        let p = product("APPLE", "IPHONE 13", "iPhone 13", "");
        assert_eq!(describe_variant(&p), "iPhone 13 | consultar");
    }

    #[test]
    fn render_groups_pluralizes_variants() {
        let products = [product("A", "", "Flip 6", "1"), product("A", "", "Flip 6", "2")];
        let groups = group_by_model(&products, None);
        let lines = render_groups(&groups);
        assert_eq!(lines[0], "Flip 6 (2 variants)");
        assert_eq!(lines.len(), 3);
    }

    fn test_config(catalog_urls: Vec<String>) -> AppConfig {
        AppConfig {
            env: vitrina_core::Environment::Test,
            log_level: "info".to_owned(),
            catalog_urls,
            cache_dir: std::path::PathBuf::from("./.vitrina-cache"),
            request_timeout_secs: 30,
            user_agent: "vitrina-test".to_owned(),
            max_retries: 0,
            retry_backoff_base_secs: 0,
            search_cache_capacity: 100,
        }
    }
}
