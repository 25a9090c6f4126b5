pub mod catalog;
pub mod hierarchy;
pub mod models;
pub mod query;
pub mod result_cache;

pub use catalog::Catalog;
pub use hierarchy::{build_hierarchy, Category, Subcategory, DEFAULT_SUBCATEGORY};
pub use models::{avatars_by_model, group_by_model, visible_products, ModelGroup};
pub use query::{QueryEngine, QueryMode};
pub use result_cache::ResultCache;
