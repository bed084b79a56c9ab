//! Rendered page cache and path-based invalidation.

use crate::services::metrics::record_cache_event;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Upper bound on cached renderings.
pub const MAX_CACHED_PAGES: usize = 256;

/// Receives "this path is stale" signals after a mutation.
pub trait Revalidator: Send + Sync {
    /// Drop any cached rendering of `path` and of every path beneath it.
    fn revalidate_path(&self, path: &str);
}

/// Rendered HTML keyed by request URI (path plus query string).
///
/// Every revalidation bumps a generation counter. A renderer takes the
/// generation before reading storage and stores its HTML with
/// [`PageCache::insert_if_generation`], so a page read before a mutation
/// never outlives that mutation's revalidation.
#[derive(Debug)]
pub struct PageCache {
    pages: DashMap<String, String>,
    generation: AtomicU64,
    capacity: usize,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHED_PAGES)
    }
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: DashMap::new(),
            generation: AtomicU64::new(0),
            capacity,
        }
    }

    pub fn get(&self, uri: &str) -> Option<String> {
        let page = self.pages.get(uri).map(|entry| entry.value().clone());
        record_cache_event(if page.is_some() { "hit" } else { "miss" });
        page
    }

    /// Number of revalidations so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cache `html` under `uri` unless a revalidation happened since
    /// `generation` was read, or the cache is full. Returns whether the
    /// page is cached.
    pub fn insert_if_generation(&self, uri: &str, html: &str, generation: u64) -> bool {
        if self.generation() != generation {
            record_cache_event("stale");
            return false;
        }
        if self.pages.len() >= self.capacity && !self.pages.contains_key(uri) {
            record_cache_event("rejected");
            return false;
        }

        self.pages.insert(uri.to_string(), html.to_string());

        // A revalidation that bumped the counter before our insert landed may
        // have already swept the map; drop the entry ourselves.
        if self.generation() != generation {
            self.pages.remove_if(uri, |_, cached| cached == html);
            record_cache_event("stale");
            return false;
        }
        true
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.pages.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Revalidator for PageCache {
    fn revalidate_path(&self, path: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let before = self.pages.len();
        self.pages.retain(|uri, _| !covers(path, uri));
        let dropped = before.saturating_sub(self.pages.len());

        record_cache_event("invalidated");
        tracing::debug!(path = %path, dropped = dropped, "Revalidated cached pages");
    }
}

/// Whether invalidating `path` reaches the page cached under `uri`.
fn covers(path: &str, uri: &str) -> bool {
    let prefix = path.trim_end_matches('/');
    let uri_path = uri.split(['?', '#']).next().unwrap_or_default();

    match uri_path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
