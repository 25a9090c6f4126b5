pub mod cache;
pub mod client;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod parse;
pub(crate) mod retry;
pub mod sources;
pub mod store;
pub mod types;

pub use cache::{cache_key, CacheLookup, PersistedCache, CACHE_KEY_PREFIX, CACHE_TTL_MS};
pub use client::CsvClient;
pub use error::{FeedError, LoadErrorKind};
pub use loader::{CatalogFeed, FeedState};
pub use normalize::{normalize_row, normalize_rows};
pub use parse::parse_csv;
pub use sources::{merge_states, CatalogSources};
pub use store::{CacheStore, FileStore, MemoryStore, StoreError};
pub use types::{CsvRowError, ParsedCsv, RawRow};
