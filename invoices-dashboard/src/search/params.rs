//! Query-string rewriting for the listing's `query` and `page` parameters.

pub const QUERY_PARAM: &str = "query";
pub const PAGE_PARAM: &str = "page";

/// Ordered query parameters with URLSearchParams-style `set`/`delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(Vec<(String, String)>);

impl SearchParams {
    /// Parse a query string (without the leading `?`). Malformed input
    /// yields no parameters.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap_or_default())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first `key` in place, dropping later duplicates, or
    /// append it when absent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.0[first].1 = value;
                let mut index = 0;
                self.0.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.0.push((key.to_string(), value)),
        }
    }

    /// Remove every occurrence of `key`.
    pub fn delete(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.0).unwrap_or_default()
    }

    /// `path?params`, or just `path` when there are no parameters.
    pub fn href(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.to_query_string())
        }
    }
}

/// Apply a search term: page resets to 1, `query` is set when the term is
/// non-empty and removed otherwise.
pub fn apply_search(params: &mut SearchParams, term: &str) {
    params.set(PAGE_PARAM, "1");
    if term.is_empty() {
        params.delete(QUERY_PARAM);
    } else {
        params.set(QUERY_PARAM, term);
    }
}

/// Target URL for a search of `term` from `path?current_query`.
pub fn search_href(path: &str, current_query: &str, term: &str) -> String {
    let mut params = SearchParams::parse(current_query);
    apply_search(&mut params, term);
    params.href(path)
}

/// Link to `page` that keeps every other parameter of the current URL.
pub fn page_href(path: &str, current_query: &str, page: u32) -> String {
    let mut params = SearchParams::parse(current_query);
    params.set(PAGE_PARAM, page.to_string());
    params.href(path)
}
