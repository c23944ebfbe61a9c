//! Query engine and the search-page state.
//!
//! `search` is a pure filter over a slice of quotes. `SearchState` holds what
//! the search page shows and is only changed through its update methods:
//! `begin` when a query is submitted, `resolve` when the matching response
//! arrives, and the page setters while browsing results.

use log::{debug, info};
use serde::Serialize;

use crate::error::MarketError;
use crate::pagination::{Navigation, PageMarker, page_markers, paginate};
use crate::quote::Quote;
use crate::request::RequestSeq;
use crate::result::Result;

/// Case-insensitive substring filter over symbol and name.
///
/// The query is trimmed first; an empty query matches nothing. Catalog order
/// is preserved.
pub fn search(catalog: &[Quote], query: &str) -> Vec<Quote> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    catalog
        .iter()
        .filter(|quote| matches_query(quote, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lowercase.
fn matches_query(quote: &Quote, needle: &str) -> bool {
    quote.symbol.as_str().to_lowercase().contains(needle) || quote.name.to_lowercase().contains(needle)
}

/// State behind the search results page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    query: String,
    results: Vec<Quote>,
    current_page: usize,
    page_size: usize,
    loading: bool,
    latest: Option<RequestSeq>,
}

impl SearchState {
    /// Empty search showing `page_size` results per page.
    pub fn new(page_size: usize) -> Self {
        SearchState {
            query: String::new(),
            results: Vec::new(),
            current_page: 1,
            page_size,
            loading: false,
            latest: None,
        }
    }

    /// Query of the latest search.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// All matches of the latest answered search.
    pub fn results(&self) -> &[Quote] {
        &self.results
    }

    /// 1-based page on display.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `true` while the latest search is unanswered.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sequence number of the request the state is waiting for.
    pub fn pending(&self) -> Option<RequestSeq> {
        self.latest.filter(|_| self.loading)
    }

    /// Records a newly submitted query under request `seq`.
    ///
    /// Returns `false` for a blank query: results are cleared immediately and
    /// no request needs to be sent. Any request still in flight is superseded
    /// either way.
    pub fn begin(&mut self, query: &str, seq: RequestSeq) -> bool {
        self.query = query.trim().to_string();
        self.latest = Some(seq);
        if self.query.is_empty() {
            self.results.clear();
            self.current_page = 1;
            self.loading = false;
            return false;
        }
        self.loading = true;
        info!("Search {} started for {:?}", seq, self.query);
        true
    }

    /// Empties the page without issuing a request. Anything in flight is
    /// dropped when it arrives.
    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.current_page = 1;
        self.loading = false;
    }

    /// Applies the response to request `seq`.
    ///
    /// A response to anything but the latest, still outstanding request leaves
    /// the state untouched and returns `RequestSuperseded`. A failed latest
    /// response stops loading and hands the error back.
    pub fn resolve(&mut self, seq: RequestSeq, response: Result<Vec<Quote>>) -> Result<()> {
        if self.pending() != Some(seq) {
            let latest = self.latest.map_or(0, |s| s.0);
            debug!("Discarding search response {} (latest #{})", seq, latest);
            return Err(MarketError::RequestSuperseded { seq: seq.0, latest });
        }
        self.loading = false;
        let results = response?;
        info!("Search {} for {:?} returned {} result(s)", seq, self.query, results.len());
        self.results = results;
        self.current_page = 1;
        Ok(())
    }

    /// Previous/next availability for the current page.
    pub fn navigation(&self) -> Navigation {
        Navigation::new(self.current_page, self.total_pages())
    }

    /// Pages needed for the current results.
    pub fn total_pages(&self) -> usize {
        paginate(&self.results, self.page_size, 1).total_pages
    }

    /// Moves to `page`; out-of-range pages are ignored. Returns whether the
    /// page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        if !self.navigation().accepts(page) || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Moves one page forward, if possible.
    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page + 1)
    }

    /// Moves one page back, if possible.
    pub fn previous_page(&mut self) -> bool {
        self.current_page > 1 && self.set_page(self.current_page - 1)
    }

    /// Read-only snapshot for the presentation layer.
    pub fn view(&self) -> SearchView {
        let page = paginate(&self.results, self.page_size, self.current_page);
        SearchView {
            query: self.query.clone(),
            loading: self.loading,
            total_results: self.results.len(),
            items: page.items.to_vec(),
            navigation: self.navigation(),
            markers: page_markers(page.total_pages, self.current_page),
        }
    }
}

/// What the search page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    /// Query as typed.
    pub query: String,
    /// `true` while the search is unanswered.
    pub loading: bool,
    /// Matches across all pages.
    pub total_results: usize,
    /// Matches on the current page.
    pub items: Vec<Quote>,
    /// Previous/next availability.
    pub navigation: Navigation,
    /// Page strip, with ellipses for skipped runs.
    pub markers: Vec<PageMarker>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use proptest::prelude::*;

    fn quote(symbol: &str, name: &str) -> Quote {
        Quote::new(Symbol::new(symbol).unwrap(), name, 10.0, 0.0, 0.0)
    }

    fn two_names() -> Vec<Quote> {
        vec![quote("AAPL", "Apple Inc."), quote("MSFT", "Microsoft Corp.")]
    }

    /// Runs `query` against `catalog` as request `seq` and applies the answer.
    fn load(state: &mut SearchState, catalog: &[Quote], query: &str, seq: RequestSeq) {
        if state.begin(query, seq) {
            state.resolve(seq, Ok(search(catalog, query))).unwrap();
        }
    }

    fn symbols(quotes: &[Quote]) -> Vec<&str> {
        quotes.iter().map(|q| q.symbol.as_str()).collect()
    }

    #[test]
    fn matches_symbol_or_name_ignoring_case() {
        let catalog = two_names();
        assert_eq!(symbols(&search(&catalog, "app")), ["AAPL"]);
        assert_eq!(symbols(&search(&catalog, "CORP")), ["MSFT"]);
        assert_eq!(symbols(&search(&catalog, "  msf ")), ["MSFT"]);
        assert!(search(&catalog, "xyz").is_empty());
    }

    #[test]
    fn blank_query_matches_nothing() {
        let catalog = two_names();
        assert!(search(&catalog, "").is_empty());
        assert!(search(&catalog, "   ").is_empty());
    }

    #[test]
    fn results_keep_catalog_order() {
        let catalog = vec![quote("ZC", "Corn"), quote("AC", "Acorn"), quote("MC", "Macro")];
        assert_eq!(symbols(&search(&catalog, "c")), ["ZC", "AC", "MC"]);
    }

    #[test]
    fn stale_response_is_discarded() {
        let catalog = two_names();
        let mut state = SearchState::new(5);
        state.begin("app", RequestSeq(1));
        state.begin("corp", RequestSeq(2));

        state.resolve(RequestSeq(2), Ok(search(&catalog, "corp"))).unwrap();
        let stale = state.resolve(RequestSeq(1), Ok(search(&catalog, "app")));

        assert!(matches!(
            stale,
            Err(MarketError::RequestSuperseded { seq: 1, latest: 2 })
        ));
        assert_eq!(state.query(), "corp");
        assert_eq!(symbols(state.results()), ["MSFT"]);
    }

    #[test]
    fn older_response_arriving_first_is_discarded() {
        let mut state = SearchState::new(5);
        state.begin("app", RequestSeq(1));
        state.begin("corp", RequestSeq(2));
        let stale = state.resolve(RequestSeq(1), Ok(two_names()));
        assert!(matches!(stale, Err(MarketError::RequestSuperseded { seq: 1, latest: 2 })));
        assert!(state.is_loading());
        assert!(state.results().is_empty());
    }

    #[test]
    fn new_results_reset_to_first_page() {
        let catalog: Vec<Quote> = (0..12).map(|i| quote(&format!("S{i}"), "Stock")).collect();
        let mut state = SearchState::new(5);
        load(&mut state, &catalog, "stock", RequestSeq(1));
        assert_eq!(state.total_pages(), 3);
        assert!(state.set_page(3));
        assert_eq!(state.view().items.len(), 2);

        load(&mut state, &catalog, "s1", RequestSeq(2));
        assert_eq!(state.current_page(), 1);
        assert_eq!(symbols(state.results()), ["S1", "S10", "S11"]);
    }

    #[test]
    fn page_changes_stay_in_range() {
        let catalog: Vec<Quote> = (0..7).map(|i| quote(&format!("S{i}"), "Stock")).collect();
        let mut state = SearchState::new(5);
        load(&mut state, &catalog, "s", RequestSeq(1));
        assert!(!state.previous_page());
        assert!(state.next_page());
        assert!(!state.next_page());
        assert!(!state.set_page(0));
        assert!(!state.set_page(9));
        assert_eq!(state.current_page(), 2);
        let view = state.view();
        assert!(view.navigation.has_previous);
        assert!(!view.navigation.has_next);
    }

    #[test]
    fn failed_response_stops_loading() {
        let mut state = SearchState::new(5);
        state.begin("app", RequestSeq(4));
        let err = state
            .resolve(RequestSeq(4), Err(MarketError::TransientFetchFailure("down".into())))
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!state.is_loading());
    }

    #[test]
    fn blank_query_clears_without_request() {
        let catalog = two_names();
        let mut state = SearchState::new(5);
        load(&mut state, &catalog, "a", RequestSeq(1));
        assert!(!state.results().is_empty());
        assert!(!state.begin("  ", RequestSeq(2)));
        assert!(state.results().is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn clear_drops_in_flight_response() {
        let mut state = SearchState::new(5);
        state.begin("app", RequestSeq(1));
        state.clear();
        assert!(state.resolve(RequestSeq(1), Ok(two_names())).is_err());
        assert!(state.results().is_empty());
        assert_eq!(state.query(), "");
    }

    proptest! {
        #[test]
        fn search_is_exactly_the_predicate(
            names in proptest::collection::vec("[A-Za-z .]{1,12}", 0..20),
            query in "[A-Za-z]{0,3}",
        ) {
            let catalog: Vec<Quote> = names
                .iter()
                .enumerate()
                .map(|(i, name)| quote(&format!("T{i}"), name))
                .collect();
            let found = search(&catalog, &query);
            let needle = query.to_lowercase();
            let holds = |q: &Quote| {
                !needle.is_empty()
                    && (q.symbol.as_str().to_lowercase().contains(&needle)
                        || q.name.to_lowercase().contains(&needle))
            };
            for q in &found {
                prop_assert!(holds(q));
            }
            for q in catalog.iter().filter(|q| !found.contains(q)) {
                prop_assert!(!holds(q));
            }
        }
    }
}
