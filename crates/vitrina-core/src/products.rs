use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::text::clean;

/// Hosts whose links open an external photo album instead of a list of images.
const GALLERY_HOSTS: [&str; 3] = ["drive.google.com", "photos.app.goo.gl", "photos.google.com"];

/// One catalog entry, i.e. one spreadsheet row after ingestion.
///
/// Every field is a trimmed string; absent columns are `""`, never `None`,
/// so consumers can run string operations unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Upper-cased category name, e.g. `"CELULARES"`.
    pub category: String,
    /// Upper-cased subcategory. Blank values are grouped under `"General"`
    /// by the hierarchy builder, not here.
    pub subcategory: String,
    /// Upper-cased product line, e.g. `"IPHONE 15"`.
    pub line: String,
    pub model: String,
    /// Free-form price text. Empty means "ask for a quote".
    pub price: String,
    /// `"x"` (any case) hides the row from listings.
    pub hidden: String,
    pub version: String,
    pub specs_url: String,
    /// Free-form tag. `"NEW"` and `"SALE"` drive the tag queries.
    pub label: String,
    pub capacity: String,
    pub condition: String,
    pub color: String,
    pub battery: String,
    /// Comma-separated image URLs, or a single external album link.
    pub photos: String,
    pub avatar: String,
    /// Normalized copies of the searchable fields, computed at ingestion.
    ///
    /// Absent on products deserialized from caches written before shadow
    /// fields existed; search then normalizes on the fly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchFields>,
}

/// Precomputed [`clean`] forms of the fields the generic search matches against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFields {
    pub model: String,
    pub line: String,
    pub version: String,
    pub label: String,
    pub capacity: String,
    pub color: String,
    pub subcategory: String,
}

impl SearchFields {
    #[must_use]
    pub fn for_product(product: &Product) -> Self {
        Self {
            model: clean(&product.model),
            line: clean(&product.line),
            version: clean(&product.version),
            label: clean(&product.label),
            capacity: clean(&product.capacity),
            color: clean(&product.color),
            subcategory: clean(&product.subcategory),
        }
    }
}

/// Where a product's photos live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    None,
    /// A hosted album that must be opened as a link.
    External(String),
    /// Direct image URLs, in sheet order.
    Gallery(Vec<String>),
}

impl Product {
    /// Returns the product with its [`SearchFields`] populated.
    #[must_use]
    pub fn with_search_fields(mut self) -> Self {
        self.search = Some(SearchFields::for_product(&self));
        self
    }

    /// Returns `true` when the sheet marks this row as hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden.trim().eq_ignore_ascii_case("x")
    }

    /// Returns `true` when the label carries `tag` (e.g. `"NEW"`), ignoring
    /// case and surrounding whitespace.
    #[must_use]
    pub fn has_label(&self, tag: &str) -> bool {
        self.label.trim().to_uppercase().contains(tag)
    }

    /// Normalized line, model, version, label, capacity and color, in that
    /// order. Uses the shadow fields when present.
    #[must_use]
    pub fn searchable_fields(&self) -> [Cow<'_, str>; 6] {
        match &self.search {
            Some(s) => [
                Cow::Borrowed(s.line.as_str()),
                Cow::Borrowed(s.model.as_str()),
                Cow::Borrowed(s.version.as_str()),
                Cow::Borrowed(s.label.as_str()),
                Cow::Borrowed(s.capacity.as_str()),
                Cow::Borrowed(s.color.as_str()),
            ],
            None => [
                Cow::Owned(clean(&self.line)),
                Cow::Owned(clean(&self.model)),
                Cow::Owned(clean(&self.version)),
                Cow::Owned(clean(&self.label)),
                Cow::Owned(clean(&self.capacity)),
                Cow::Owned(clean(&self.color)),
            ],
        }
    }

    /// Classifies the `photos` column.
    #[must_use]
    pub fn photo_source(&self) -> PhotoSource {
        let entries: Vec<String> = self
            .photos
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        match entries.as_slice() {
            [] => PhotoSource::None,
            [single] if GALLERY_HOSTS.iter().any(|host| single.contains(host)) => {
                PhotoSource::External(single.clone())
            }
            _ => PhotoSource::Gallery(entries),
        }
    }
}
