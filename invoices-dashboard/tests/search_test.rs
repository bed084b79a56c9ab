//! Debounced search-to-URL synchronization on a paused clock.

mod common;

use common::RecordingNavigator;
use invoices_dashboard::search::{SearchParams, SearchSynchronizer, SEARCH_DEBOUNCE};
use std::sync::Arc;
use std::time::Duration;

const LISTING: &str = "/dashboard/invoices";

fn params_of(href: &str) -> SearchParams {
    let (path, query) = href.split_once('?').unwrap_or((href, ""));
    assert_eq!(path, LISTING);
    SearchParams::parse(query)
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_collapse_into_one_navigation() {
    let navigator = Arc::new(RecordingNavigator::default());
    let sync = SearchSynchronizer::new(LISTING, "page=3", navigator.clone());

    for term in ["a", "ab", "abc"] {
        sync.on_input(term);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(navigator.hrefs().is_empty());

    tokio::time::sleep(SEARCH_DEBOUNCE).await;

    let hrefs = navigator.hrefs();
    assert_eq!(hrefs.len(), 1);
    let params = params_of(&hrefs[0]);
    assert_eq!(params.get("query"), Some("abc"));
    assert_eq!(params.get("page"), Some("1"));
}

#[tokio::test(start_paused = true)]
async fn clearing_the_input_removes_query() {
    let navigator = Arc::new(RecordingNavigator::default());
    let sync = SearchSynchronizer::new(LISTING, "query=abc&page=2", navigator.clone());

    sync.on_input("");
    tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(10)).await;

    let hrefs = navigator.hrefs();
    assert_eq!(hrefs.len(), 1);
    let params = params_of(&hrefs[0]);
    assert_eq!(params.get("query"), None);
    assert_eq!(params.get("page"), Some("1"));
}

#[tokio::test(start_paused = true)]
async fn each_navigation_builds_on_the_previous_url() {
    let navigator = Arc::new(RecordingNavigator::default());
    let sync = SearchSynchronizer::new(LISTING, "sort=date", navigator.clone());

    sync.on_input("lee");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(sync.current_query(), "sort=date&page=1&query=lee");

    sync.on_input("");
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(
        navigator.hrefs(),
        vec![
            "/dashboard/invoices?sort=date&page=1&query=lee".to_string(),
            "/dashboard/invoices?sort=date&page=1".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_the_synchronizer_cancels_pending_search() {
    let navigator = Arc::new(RecordingNavigator::default());
    let sync = SearchSynchronizer::new(LISTING, "", navigator.clone());

    sync.on_input("abc");
    drop(sync);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(navigator.hrefs().is_empty());
}
