//! Category → subcategory → product tree built from the flat catalog.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use vitrina_core::Product;

/// Subcategory name used for products whose subcategory cell is blank.
pub const DEFAULT_SUBCATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Products in this category before any query narrowed it.
    pub total_product_count: usize,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subcategory {
    pub name: String,
    pub products: Vec<Arc<Product>>,
    /// Distinct non-empty product lines, in first-seen order.
    pub lines: Vec<String>,
}

impl Category {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            total_product_count: 0,
            subcategories: Vec::new(),
        }
    }

    /// Finds a subcategory by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn subcategory(&self, name: &str) -> Option<&Subcategory> {
        let wanted = name.trim().to_uppercase();
        self.subcategories
            .iter()
            .find(|s| s.name.to_uppercase() == wanted)
    }
}

impl Subcategory {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            products: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Builds a subcategory from an already-selected product list,
    /// recomputing its lines.
    #[must_use]
    pub fn with_products(name: &str, products: Vec<Arc<Product>>) -> Self {
        let mut sub = Self::empty(name);
        for product in products {
            sub.push(product);
        }
        sub
    }

    fn push(&mut self, product: Arc<Product>) {
        let line = product.line.trim();
        if !line.is_empty() && !self.lines.iter().any(|l| l == line) {
            self.lines.push(line.to_owned());
        }
        self.products.push(product);
    }
}

/// Groups `products` into categories and subcategories.
///
/// Categories and subcategories appear in the order their first product
/// appears; products keep source order. Products with a blank category are
/// left out.
#[must_use]
pub fn build_hierarchy(products: &[Arc<Product>]) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    let mut category_index: HashMap<&str, usize> = HashMap::new();
    let mut subcategory_index: Vec<HashMap<&str, usize>> = Vec::new();

    for product in products {
        let category_name = product.category.as_str();
        if category_name.trim().is_empty() {
            continue;
        }

        let ci = *category_index.entry(category_name).or_insert_with(|| {
            categories.push(Category::empty(category_name));
            subcategory_index.push(HashMap::new());
            categories.len() - 1
        });
        let category = &mut categories[ci];
        category.total_product_count += 1;

        let subcategory_name = match product.subcategory.trim() {
            "" => DEFAULT_SUBCATEGORY,
            name => name,
        };
        let si = *subcategory_index[ci]
            .entry(subcategory_name)
            .or_insert_with(|| {
                category
                    .subcategories
                    .push(Subcategory::empty(subcategory_name));
                category.subcategories.len() - 1
            });
        category.subcategories[si].push(Arc::clone(product));
    }

    tracing::debug!(
        products = products.len(),
        categories = categories.len(),
        "built catalog hierarchy"
    );
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(category: &str, subcategory: &str, line: &str, model: &str) -> Arc<Product> {
        Arc::new(Product {
            category: category.to_owned(),
            subcategory: subcategory.to_owned(),
            line: line.to_owned(),
            model: model.to_owned(),
            ..Product::default()
        })
    }

    fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<&str> {
        items.iter().map(name).collect()
    }

    #[test]
    fn preserves_first_appearance_order() {
        let products = vec![
            product("CELULARES", "APPLE", "IPHONE 13", "iPhone 13"),
            product("AUDIO", "JBL", "", "Flip 6"),
            product("CELULARES", "SAMSUNG", "GALAXY S", "S23"),
            product("CELULARES", "APPLE", "IPHONE 12", "iPhone 12"),
            product("AUDIO", "APPLE", "AIRPODS", "AirPods Pro"),
        ];
        let tree = build_hierarchy(&products);

        assert_eq!(names(&tree, |c| c.name.as_str()), vec!["CELULARES", "AUDIO"]);
        assert_eq!(
            names(&tree[0].subcategories, |s| s.name.as_str()),
            vec!["APPLE", "SAMSUNG"]
        );
        assert_eq!(tree[0].subcategories[0].lines, vec!["IPHONE 13", "IPHONE 12"]);
        assert_eq!(
            names(&tree[0].subcategories[0].products, |p| p.model.as_str()),
            vec!["iPhone 13", "iPhone 12"]
        );
        assert_eq!(tree[0].total_product_count, 3);
        assert_eq!(tree[1].total_product_count, 2);
    }

    #[test]
    fn blank_subcategory_goes_to_general() {
        let tree = build_hierarchy(&[product("AUDIO", "  ", "", "Flip 6")]);
        assert_eq!(tree[0].subcategories[0].name, DEFAULT_SUBCATEGORY);
    }

    #[test]
    fn skips_products_without_category() {
        let tree = build_hierarchy(&[product("", "APPLE", "", "Cable"), product("AUDIO", "", "", "Flip 6")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].total_product_count, 1);
    }

    #[test]
    fn lines_are_distinct_and_skip_blank() {
        let tree = build_hierarchy(&[
            product("CELULARES", "APPLE", "IPHONE 13", "a"),
            product("CELULARES", "APPLE", "", "b"),
            product("CELULARES", "APPLE", "IPHONE 13", "c"),
        ]);
        assert_eq!(tree[0].subcategories[0].lines, vec!["IPHONE 13"]);
        assert_eq!(tree[0].subcategories[0].products.len(), 3);
    }

    #[test]
    fn products_are_shared_not_copied() {
        let products = vec![product("AUDIO", "JBL", "", "Flip 6")];
        let tree = build_hierarchy(&products);
        assert!(Arc::ptr_eq(&products[0], &tree[0].subcategories[0].products[0]));
    }

    #[test]
    fn subcategory_lookup_ignores_case() {
        let tree = build_hierarchy(&[product("AUDIO", "", "", "Flip 6")]);
        assert!(tree[0].subcategory(" general ").is_some());
        assert!(tree[0].subcategory("JBL").is_none());
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        assert!(build_hierarchy(&[]).is_empty());
    }
}
