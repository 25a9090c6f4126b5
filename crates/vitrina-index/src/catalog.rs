//! The in-memory catalog a storefront queries: flat product list, the
//! hierarchy built from it, and the query engine with its result cache.

use std::collections::HashMap;
use std::sync::Arc;

use vitrina_core::Product;

use crate::hierarchy::{build_hierarchy, Category};
use crate::models::avatars_by_model;
use crate::query::QueryEngine;

#[derive(Debug)]
pub struct Catalog {
    products: Vec<Arc<Product>>,
    hierarchy: Arc<Vec<Category>>,
    engine: QueryEngine,
}

impl Catalog {
    /// Builds a catalog whose free-text result cache holds at most
    /// `search_cache_capacity` queries.
    #[must_use]
    pub fn new<I>(products: I, search_cache_capacity: usize) -> Self
    where
        I: IntoIterator<Item = Product>,
    {
        let products: Vec<Arc<Product>> = products.into_iter().map(Arc::new).collect();
        let hierarchy = Arc::new(build_hierarchy(&products));
        Self {
            products,
            hierarchy,
            engine: QueryEngine::new(search_cache_capacity),
        }
    }

    /// Swaps in a new product list, rebuilding the hierarchy and dropping
    /// every memoized search result.
    pub fn replace<I>(&mut self, products: I)
    where
        I: IntoIterator<Item = Product>,
    {
        self.products = products.into_iter().map(Arc::new).collect();
        self.hierarchy = Arc::new(build_hierarchy(&self.products));
        self.engine.clear_cache();
        tracing::info!(
            products = self.products.len(),
            categories = self.hierarchy.len(),
            "catalog replaced"
        );
    }

    /// Categories matching `query`. See [`QueryEngine::filter`].
    pub fn search(&mut self, query: &str) -> Arc<Vec<Category>> {
        self.engine.filter(&self.hierarchy, &self.products, query)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.hierarchy
    }

    /// Looks a category up by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        let wanted = name.trim().to_uppercase();
        self.hierarchy.iter().find(|c| c.name == wanted)
    }

    #[must_use]
    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    /// See [`avatars_by_model`].
    #[must_use]
    pub fn avatars_by_model(&self) -> HashMap<String, String> {
        avatars_by_model(&self.products)
    }

    #[must_use]
    pub fn cached_searches(&self) -> usize {
        self.engine.cached_results()
    }
}
