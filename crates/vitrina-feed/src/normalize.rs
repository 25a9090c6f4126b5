//! Ingestion from raw CSV rows to [`vitrina_core::Product`].
//!
//! Column names live in [`crate::types`]; this module decides which rows are
//! products and how each cell is cleaned up.

use vitrina_core::Product;

use crate::error::FeedError;
use crate::types::{
    RawRow, COL_AVATAR, COL_BATTERY, COL_CAPACITY, COL_CATEGORY, COL_COLOR, COL_CONDITION,
    COL_HIDDEN, COL_LABEL, COL_LINE, COL_MODEL, COL_PHOTOS, COL_PRICE, COL_SPECS,
    COL_SUBCATEGORY, COL_VERSION,
};

/// Normalizes one raw row into a [`Product`].
///
/// Returns `Ok(None)` for rows that are not products: rows with blank
/// category, subcategory and model, and header rows repeated inside the data.
///
/// # Errors
///
/// Returns [`FeedError::Normalization`] if a cell is not valid UTF-8.
pub fn normalize_row(row: &RawRow) -> Result<Option<Product>, FeedError> {
    let category = row.field(COL_CATEGORY)?.trim();
    let subcategory = row.field(COL_SUBCATEGORY)?.trim();
    let model = row.field(COL_MODEL)?.trim();

    if category.is_empty() && subcategory.is_empty() && model.is_empty() {
        return Ok(None);
    }

    if category.eq_ignore_ascii_case(COL_CATEGORY)
        && subcategory.eq_ignore_ascii_case(COL_SUBCATEGORY)
    {
        return Ok(None);
    }

    let text = |column: &str| -> Result<String, FeedError> {
        Ok(row.field(column)?.trim().to_owned())
    };

    let product = Product {
        category: category.to_uppercase(),
        subcategory: subcategory.to_uppercase(),
        line: text(COL_LINE)?.to_uppercase(),
        model: model.to_owned(),
        price: text(COL_PRICE)?,
        hidden: text(COL_HIDDEN)?,
        version: text(COL_VERSION)?,
        specs_url: text(COL_SPECS)?,
        label: text(COL_LABEL)?,
        capacity: text(COL_CAPACITY)?,
        condition: text(COL_CONDITION)?,
        color: text(COL_COLOR)?,
        battery: text(COL_BATTERY)?,
        photos: text(COL_PHOTOS)?,
        avatar: text(COL_AVATAR)?,
        search: None,
    };

    Ok(Some(product.with_search_fields()))
}

/// Normalizes every row, keeping source order and dropping non-product rows.
///
/// **All-or-nothing**: one failing row fails the whole batch, so a partially
/// ingested catalog is never published.
///
/// # Errors
///
/// Propagates the first [`FeedError::Normalization`] from [`normalize_row`].
pub fn normalize_rows(rows: &[RawRow]) -> Result<Vec<Product>, FeedError> {
    let mut products = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(product) = normalize_row(row)? {
            products.push(product);
        }
    }
    Ok(products)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
