//! Keeps the listing URL's `query`/`page` parameters in sync with the
//! search box.

pub mod debounce;
pub mod params;

pub use debounce::Debouncer;
pub use params::{apply_search, page_href, search_href, SearchParams, PAGE_PARAM, QUERY_PARAM};

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Quiet window after the last keystroke before the URL is rewritten.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Client-side navigation. `replace` swaps the current URL without adding a
/// history entry.
pub trait Navigator: Send + Sync {
    fn replace(&self, href: &str);
}

struct Location {
    path: String,
    query: String,
}

/// Debounces search input and replaces the URL once typing settles.
pub struct SearchSynchronizer {
    location: Arc<Mutex<Location>>,
    debouncer: Debouncer<String>,
}

impl SearchSynchronizer {
    pub fn new(path: &str, current_query: &str, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_delay(path, current_query, navigator, SEARCH_DEBOUNCE)
    }

    pub fn with_delay(
        path: &str,
        current_query: &str,
        navigator: Arc<dyn Navigator>,
        delay: Duration,
    ) -> Self {
        let location = Arc::new(Mutex::new(Location {
            path: path.to_string(),
            query: current_query.trim_start_matches('?').to_string(),
        }));

        let shared = location.clone();
        let debouncer = Debouncer::new(delay, move |term: String| {
            let href = {
                let mut location = shared.lock().unwrap_or_else(|e| e.into_inner());
                let mut params = SearchParams::parse(&location.query);
                apply_search(&mut params, &term);
                location.query = params.to_query_string();
                params.href(&location.path)
            };
            debug!(term = %term, href = %href, "Searching");
            navigator.replace(&href);
            async {}
        });

        Self {
            location,
            debouncer,
        }
    }

    /// Feed the search box's current value.
    pub fn on_input(&self, term: impl Into<String>) {
        self.debouncer.call(term.into());
    }

    /// Query string the synchronizer currently considers live.
    pub fn current_query(&self) -> String {
        self.location
            .lock()
            .map(|location| location.query.clone())
            .unwrap_or_default()
    }
}
