//! `cache` maintenance commands.

use vitrina_feed::{cache_key, CacheStore, PersistedCache};

/// Remove the cached catalog for `url`, or every cached catalog.
pub(crate) fn run_cache_clear<S: CacheStore>(cache: &PersistedCache<S>, url: Option<&str>) {
    match url.map(str::trim) {
        Some(url) => {
            cache.clear(&cache_key(url));
            println!("removed cached catalog for {url}");
        }
        None => {
            let removed = cache.clear_product_cache();
            println!("removed {removed} cached catalog(s)");
        }
    }
}
