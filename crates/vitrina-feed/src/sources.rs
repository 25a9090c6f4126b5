//! Catalogs published as several sheets (e.g. a generic list plus a sheet of
//! special products) loaded together and shown as one list.

use std::sync::Arc;

use futures::future::join_all;
use vitrina_core::Product;

use crate::cache::PersistedCache;
use crate::client::CsvClient;
use crate::loader::{CatalogFeed, FeedState};
use crate::store::CacheStore;

/// One [`CatalogFeed`] per URL, sharing a client and a persisted cache.
pub struct CatalogSources<S> {
    sources: Vec<(String, CatalogFeed<S>)>,
}

impl<S: CacheStore + 'static> CatalogSources<S> {
    #[must_use]
    pub fn new(client: &CsvClient, cache: &Arc<PersistedCache<S>>, urls: &[String]) -> Self {
        let sources = urls
            .iter()
            .map(|url| {
                (
                    url.clone(),
                    CatalogFeed::new(client.clone(), Arc::clone(cache)),
                )
            })
            .collect();
        Self { sources }
    }

    /// Loads every source concurrently and returns the merged state.
    pub async fn load_sources(&self) -> FeedState {
        let states = join_all(self.sources.iter().map(|(url, feed)| feed.load(url))).await;
        merge_states(&states)
    }

    /// Merged view of the current per-source states.
    pub async fn snapshot(&self) -> FeedState {
        let states = join_all(self.sources.iter().map(|(_, feed)| feed.snapshot())).await;
        merge_states(&states)
    }

    /// Waits for every source's pending background refresh.
    pub async fn settle(&self) {
        join_all(self.sources.iter().map(|(_, feed)| feed.settle())).await;
    }
}

/// Merges per-source states in source order: products concatenated,
/// `loading` if any source is loading, `error` from the first failing source.
#[must_use]
pub fn merge_states(states: &[FeedState]) -> FeedState {
    let products: Vec<Product> = states
        .iter()
        .flat_map(|s| s.products.iter().cloned())
        .collect();
    FeedState {
        products: Arc::new(products),
        loading: states.iter().any(|s| s.loading),
        error: states.iter().find_map(|s| s.error),
    }
}
