//! Product-list helpers for a subcategory page: visible rows grouped into
//! one card per model.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use vitrina_core::Product;

/// Model name used when the model cell is blank.
pub const UNNAMED_MODEL: &str = "-";

/// All visible variants of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelGroup {
    pub model: String,
    pub variants: Vec<Arc<Product>>,
    pub avatar: Option<String>,
}

/// Drops products marked hidden.
#[must_use]
pub fn visible_products(products: &[Arc<Product>]) -> Vec<Arc<Product>> {
    products
        .iter()
        .filter(|p| !p.is_hidden())
        .map(Arc::clone)
        .collect()
}

fn model_key(product: &Product) -> &str {
    match product.model.trim() {
        "" => UNNAMED_MODEL,
        model => model,
    }
}

fn first_avatar(product: &Product) -> Option<&str> {
    Some(product.avatar.trim()).filter(|a| !a.is_empty())
}

/// Model → first non-empty avatar, over every product given.
///
/// Built from the full catalog so a search result that only kept
/// avatar-less variants can still show the model's picture.
#[must_use]
pub fn avatars_by_model(products: &[Arc<Product>]) -> HashMap<String, String> {
    let mut avatars = HashMap::new();
    for product in products {
        if let Some(avatar) = first_avatar(product) {
            avatars
                .entry(model_key(product).to_owned())
                .or_insert_with(|| avatar.to_owned());
        }
    }
    avatars
}

/// Groups the visible products by model, in first-seen order.
///
/// A group's avatar comes from `avatars` when it has an entry for the
/// model, otherwise from the group's first variant that has one.
#[must_use]
pub fn group_by_model(
    products: &[Arc<Product>],
    avatars: Option<&HashMap<String, String>>,
) -> Vec<ModelGroup> {
    let visible = visible_products(products);
    let mut groups: Vec<ModelGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for product in &visible {
        let model = model_key(product);
        let gi = *index.entry(model).or_insert_with(|| {
            groups.push(ModelGroup {
                model: model.to_owned(),
                variants: Vec::new(),
                avatar: None,
            });
            groups.len() - 1
        });
        let group = &mut groups[gi];
        if group.avatar.is_none() {
            group.avatar = first_avatar(product).map(str::to_owned);
        }
        group.variants.push(Arc::clone(product));
    }

    if let Some(avatars) = avatars {
        for group in &mut groups {
            if let Some(avatar) = avatars.get(&group.model) {
                group.avatar = Some(avatar.clone());
            }
        }
    }
    groups
}
