//! Cache-first catalog loading.
//!
//! [`CatalogFeed::load`] publishes a catalog into a shared [`FeedState`]:
//! a fresh persisted copy is shown immediately and refreshed in the
//! background, otherwise the CSV is fetched, ingested and cached. Every
//! call takes a new generation token; completions holding an outdated
//! token leave the visible state alone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use vitrina_core::Product;

use crate::cache::{cache_key, CacheLookup, PersistedCache, CACHE_TTL_MS};
use crate::client::CsvClient;
use crate::error::{FeedError, LoadErrorKind};
use crate::normalize::normalize_rows;
use crate::store::CacheStore;

/// What a catalog view renders: the product list plus load status.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub products: Arc<Vec<Product>>,
    pub loading: bool,
    pub error: Option<LoadErrorKind>,
}

impl FeedState {
    fn ready(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(products),
            loading: false,
            error: None,
        }
    }

    fn failed(kind: LoadErrorKind) -> Self {
        Self {
            products: Arc::new(Vec::new()),
            loading: false,
            error: Some(kind),
        }
    }
}

/// Loads one catalog URL at a time into a shared, observable state.
pub struct CatalogFeed<S> {
    client: CsvClient,
    cache: Arc<PersistedCache<S>>,
    state: Arc<RwLock<FeedState>>,
    generation: Arc<AtomicU64>,
    refresh: Mutex<Option<JoinHandle<()>>>,
}

impl<S: CacheStore + 'static> CatalogFeed<S> {
    #[must_use]
    pub fn new(client: CsvClient, cache: Arc<PersistedCache<S>>) -> Self {
        Self {
            client,
            cache,
            state: Arc::new(RwLock::new(FeedState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            refresh: Mutex::new(None),
        }
    }

    /// Current visible state.
    pub async fn snapshot(&self) -> FeedState {
        self.state.read().await.clone()
    }

    /// Loads the catalog at `url` and returns the resulting visible state.
    ///
    /// Failures never escape as errors; they are reported through
    /// [`FeedState::error`]. If a newer `load` started while this one was in
    /// flight, the returned state is whatever the newer call published.
    pub async fn load(&self, url: &str) -> FeedState {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let url = url.trim();

        if url.is_empty() {
            tracing::warn!("catalog load requested without a URL");
            publish(
                &self.state,
                &self.generation,
                token,
                FeedState::failed(LoadErrorKind::InvalidUrl),
            )
            .await;
            return self.snapshot().await;
        }

        let key = cache_key(url);
        let fallback = match self.cache.lookup::<Vec<Product>>(&key) {
            CacheLookup::Fresh(products) => {
                tracing::debug!(url, products = products.len(), "serving catalog from cache");
                publish(&self.state, &self.generation, token, FeedState::ready(products)).await;
                self.spawn_refresh(url, token).await;
                return self.snapshot().await;
            }
            other => other.into_any(),
        };

        {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) == token {
                state.loading = true;
                state.error = None;
            }
        }

        let next = match fetch_products(&self.client, url).await {
            Ok(products) => {
                tracing::info!(url, products = products.len(), "catalog fetched");
                self.cache.set(&key, &products, CACHE_TTL_MS);
                FeedState::ready(products)
            }
            Err(e) => {
                let kind = e.kind();
                match fallback {
                    Some(products) if kind == LoadErrorKind::Network => {
                        tracing::warn!(url, error = %e, "catalog fetch failed, using cached copy");
                        FeedState::ready(products)
                    }
                    _ => {
                        tracing::warn!(url, error = %e, kind = %kind, "catalog load failed");
                        FeedState::failed(kind)
                    }
                }
            }
        };

        if !publish(&self.state, &self.generation, token, next).await {
            tracing::debug!(url, token, "discarding superseded catalog load");
        }
        self.snapshot().await
    }

    /// Waits for the most recent background refresh, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.refresh.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "background catalog refresh task failed");
            }
        }
    }

    async fn spawn_refresh(&self, url: &str, token: u64) {
        let client = self.client.clone();
        let cache = Arc::clone(&self.cache);
        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        let url = url.to_owned();

        let handle = tokio::spawn(async move {
            match fetch_products(&client, &url).await {
                Ok(products) => {
                    tracing::info!(
                        url = %url,
                        products = products.len(),
                        "catalog refreshed in background"
                    );
                    cache.set(&cache_key(&url), &products, CACHE_TTL_MS);
                    let mut state = state.write().await;
                    if generation.load(Ordering::SeqCst) == token && state.products.is_empty() {
                        state.products = Arc::new(products);
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "background catalog refresh failed");
                }
            }
        });

        *self.refresh.lock().await = Some(handle);
    }
}

/// Replaces the visible state if `token` is still the latest generation.
async fn publish(
    state: &RwLock<FeedState>,
    generation: &AtomicU64,
    token: u64,
    next: FeedState,
) -> bool {
    let mut state = state.write().await;
    if generation.load(Ordering::SeqCst) != token {
        return false;
    }
    *state = next;
    true
}

/// Downloads, parses and ingests the catalog at `url`.
///
/// # Errors
///
/// - Any [`CsvClient::fetch_csv`] error.
/// - [`FeedError::CsvStructure`] if the document has structural errors.
/// - [`FeedError::Normalization`] if a row cannot be ingested.
async fn fetch_products(client: &CsvClient, url: &str) -> Result<Vec<Product>, FeedError> {
    let parsed = client.fetch_csv(url).await?;
    if let Some(first) = parsed.errors.first() {
        return Err(FeedError::CsvStructure {
            url: url.to_owned(),
            error_count: parsed.errors.len(),
            first: first.to_string(),
        });
    }
    normalize_rows(&parsed.rows)
}
