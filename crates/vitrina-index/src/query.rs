//! Narrowing the hierarchy to what a search box query asks for.
//!
//! Two queries are reserved: `NEW` shows every variant of a model that has at
//! least one variant labelled NEW, and `SALE` shows only the variants labelled
//! SALE. Anything else is a free-text search where every word must appear in
//! some searchable field of the product.

use std::collections::HashSet;
use std::sync::Arc;

use vitrina_core::{clean, Product};

use crate::hierarchy::{Category, Subcategory};
use crate::result_cache::ResultCache;

const NEW_TAG: &str = "NEW";
const SALE_TAG: &str = "SALE";

/// How a raw query string is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Blank query: the hierarchy as built.
    All,
    New,
    Sale,
    /// Free-text search; holds the query after [`clean`].
    Text(String),
}

impl QueryMode {
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return QueryMode::All;
        }
        match trimmed.to_uppercase().as_str() {
            NEW_TAG => QueryMode::New,
            SALE_TAG => QueryMode::Sale,
            _ => QueryMode::Text(clean(trimmed)),
        }
    }
}

/// Filters hierarchies and memoizes free-text results.
#[derive(Debug)]
pub struct QueryEngine {
    cache: ResultCache<Arc<Vec<Category>>>,
}

impl QueryEngine {
    #[must_use]
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: ResultCache::new(cache_capacity),
        }
    }

    /// Returns the part of `hierarchy` matching `query`.
    ///
    /// `products` is the flat list the hierarchy was built from; the NEW
    /// query needs it to find models across the whole catalog. A blank query
    /// returns `hierarchy` itself.
    ///
    /// Free-text results are cached by cleaned query and category count, so
    /// callers that swap the catalog for one of the same shape must call
    /// [`QueryEngine::clear_cache`].
    pub fn filter(
        &mut self,
        hierarchy: &Arc<Vec<Category>>,
        products: &[Arc<Product>],
        query: &str,
    ) -> Arc<Vec<Category>> {
        match QueryMode::parse(query) {
            QueryMode::All => Arc::clone(hierarchy),
            QueryMode::New => {
                let new_models: HashSet<&str> = products
                    .iter()
                    .filter(|p| p.has_label(NEW_TAG))
                    .map(|p| p.model.as_str())
                    .collect();
                Arc::new(narrow_by(hierarchy, |p| {
                    new_models.contains(p.model.as_str())
                }))
            }
            QueryMode::Sale => Arc::new(narrow_by(hierarchy, |p| p.has_label(SALE_TAG))),
            QueryMode::Text(cleaned) => {
                let key = format!("{cleaned}_{}", hierarchy.len());
                if let Some(hit) = self.cache.get(&key) {
                    tracing::debug!(key = %key, "query result cache hit");
                    return Arc::clone(hit);
                }
                let words: Vec<&str> = cleaned.split(' ').filter(|w| !w.is_empty()).collect();
                let result = Arc::new(search_text(hierarchy, &words));
                self.cache.set(key, Arc::clone(&result));
                result
            }
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }
}

/// Keeps products passing `keep`, dropping emptied subcategories and
/// categories. Totals are recounted from what is left.
fn narrow_by<F>(hierarchy: &[Category], keep: F) -> Vec<Category>
where
    F: Fn(&Product) -> bool,
{
    hierarchy
        .iter()
        .filter_map(|category| {
            let subcategories: Vec<Subcategory> = category
                .subcategories
                .iter()
                .filter_map(|sub| narrow_subcategory(sub, &keep))
                .collect();
            if subcategories.is_empty() {
                return None;
            }
            Some(Category {
                name: category.name.clone(),
                total_product_count: subcategories.iter().map(|s| s.products.len()).sum(),
                subcategories,
            })
        })
        .collect()
}

/// Free-text narrowing. Totals keep their unfiltered value.
fn search_text(hierarchy: &[Category], words: &[&str]) -> Vec<Category> {
    hierarchy
        .iter()
        .filter_map(|category| {
            let category_clean = clean(&category.name);
            let subcategories: Vec<Subcategory> = category
                .subcategories
                .iter()
                .filter_map(|sub| {
                    let subcategory_clean = clean(&sub.name);
                    narrow_subcategory(sub, |p| {
                        matches_all_words(words, &category_clean, &subcategory_clean, p)
                    })
                })
                .collect();
            if subcategories.is_empty() {
                return None;
            }
            Some(Category {
                name: category.name.clone(),
                total_product_count: category.total_product_count,
                subcategories,
            })
        })
        .collect()
}

fn narrow_subcategory<F>(sub: &Subcategory, keep: F) -> Option<Subcategory>
where
    F: Fn(&Product) -> bool,
{
    let products: Vec<Arc<Product>> = sub
        .products
        .iter()
        .filter(|p| keep(p))
        .map(Arc::clone)
        .collect();
    if products.is_empty() {
        None
    } else {
        Some(Subcategory::with_products(&sub.name, products))
    }
}

/// AND across words, OR across fields.
fn matches_all_words(words: &[&str], category: &str, subcategory: &str, product: &Product) -> bool {
    let fields = product.searchable_fields();
    words.iter().all(|&word| {
        category.contains(word)
            || subcategory.contains(word)
            || fields.iter().any(|field| field.contains(word))
    })
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
