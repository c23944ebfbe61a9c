//! Browser state: the current route, one state object per view, and the
//! data-source requests still in flight.
//!
//! Everything changes through `Browser` methods; the event loop in `main`
//! only feeds it commands and arrived responses.

use std::sync::Arc;

use chrono::Utc;
use crossbeam_channel::{Select, SelectedOperation};
use log::{debug, info, warn};
use serde::Serialize;
use stock_common::catalog::market_indices;
use stock_common::config::{MAX_FETCH_ATTEMPTS, MOVERS_LEN};
use stock_common::detail::{DetailRequests, DetailState, DetailView};
use stock_common::history::TimeRange;
use stock_common::profile::{NewsItem, market_news};
use stock_common::provider::QuoteProvider;
use stock_common::route::Route;
use stock_common::search::{SearchState, SearchView};
use stock_common::watchlist::WatchlistStore;
use stock_common::{
    CatalogStore, CompanyProfile, MarketError, PricePoint, Quote, RequestSeq, Result, Symbol,
    TickerItem, WatchlistEntry,
};
use stock_feed::{DataSource, Pending};

enum Request {
    Search(Pending<Vec<Quote>>),
    Quote(Pending<Vec<Quote>>),
    History(Pending<Vec<PricePoint>>),
    Profile(Pending<CompanyProfile>),
}

/// A request waiting for its response.
pub struct InFlight {
    request: Request,
    attempt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Search,
    Quote,
    History,
    Profile,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Search => "search",
            Kind::Quote => "quote",
            Kind::History => "history",
            Kind::Profile => "company profile",
        }
    }
}

/// A response, tagged with the sequence number of its request.
#[derive(Debug)]
pub enum Arrival {
    Search(RequestSeq, Result<Vec<Quote>>),
    Quote(RequestSeq, Result<Vec<Quote>>),
    History(RequestSeq, Result<Vec<PricePoint>>),
    Profile(RequestSeq, Result<CompanyProfile>),
}

fn flatten<T>(received: std::result::Result<Result<T>, crossbeam_channel::RecvError>) -> Result<T> {
    received.map_err(MarketError::from).and_then(|result| result)
}

impl InFlight {
    /// Adds this request's channel to `select`, returning its operation index.
    pub fn register<'a>(&'a self, select: &mut Select<'a>) -> usize {
        match &self.request {
            Request::Search(pending) | Request::Quote(pending) => select.recv(pending.receiver()),
            Request::History(pending) => select.recv(pending.receiver()),
            Request::Profile(pending) => select.recv(pending.receiver()),
        }
    }

    /// Completes a selected operation registered by `register`.
    pub fn receive(&self, operation: SelectedOperation<'_>) -> Arrival {
        match &self.request {
            Request::Search(pending) => Arrival::Search(pending.seq(), flatten(operation.recv(pending.receiver()))),
            Request::Quote(pending) => Arrival::Quote(pending.seq(), flatten(operation.recv(pending.receiver()))),
            Request::History(pending) => {
                Arrival::History(pending.seq(), flatten(operation.recv(pending.receiver())))
            }
            Request::Profile(pending) => {
                Arrival::Profile(pending.seq(), flatten(operation.recv(pending.receiver())))
            }
        }
    }

    fn wait(self) -> Arrival {
        match self.request {
            Request::Search(pending) => Arrival::Search(pending.seq(), pending.wait()),
            Request::Quote(pending) => Arrival::Quote(pending.seq(), pending.wait()),
            Request::History(pending) => Arrival::History(pending.seq(), pending.wait()),
            Request::Profile(pending) => Arrival::Profile(pending.seq(), pending.wait()),
        }
    }
}

/// Market overview shown on the home route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub tape: Vec<TickerItem>,
    pub top_gainers: Vec<Quote>,
    pub top_losers: Vec<Quote>,
    pub news: Vec<NewsItem>,
}

/// What the current route renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    Home(HomeView),
    Search(SearchView),
    Stock(DetailView),
    Watchlist { entries: Vec<WatchlistEntry> },
    Auth,
    NotFound { path: String },
}

/// The browser and every piece of state behind its views.
pub struct Browser<S: DataSource> {
    source: S,
    catalog: Arc<CatalogStore>,
    provider: Box<dyn QuoteProvider>,
    watchlist: WatchlistStore,
    search: SearchState,
    detail: Option<DetailState>,
    route: Route,
    in_flight: Vec<InFlight>,
    notices: Vec<String>,
}

impl<S: DataSource> Browser<S> {
    pub fn new(
        source: S,
        catalog: Arc<CatalogStore>,
        provider: Box<dyn QuoteProvider>,
        watchlist: WatchlistStore,
        page_size: usize,
    ) -> Self {
        Browser {
            source,
            catalog,
            provider,
            watchlist,
            search: SearchState::new(page_size),
            detail: None,
            route: Route::Home,
            in_flight: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn in_flight(&self) -> &[InFlight] {
        &self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// User-visible messages collected since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Switches to `route`, issuing whatever requests the view needs.
    pub fn navigate(&mut self, route: Route) {
        info!("Navigating to {}", route);
        if !matches!(route, Route::Stock(_)) {
            self.detail = None;
        }
        match &route {
            Route::Search(query) => self.issue_search(query, 1),
            Route::Stock(symbol) => self.open_detail(symbol.clone()),
            Route::NotFound(path) => warn!("No view for {}", path),
            Route::Home | Route::Watchlist | Route::Auth => {}
        }
        self.route = route;
    }

    fn issue_search(&mut self, query: &str, attempt: u32) {
        if query.trim().is_empty() {
            self.search.clear();
            return;
        }
        let pending = self.source.search(query);
        self.search.begin(query, pending.seq());
        self.in_flight.push(InFlight {
            request: Request::Search(pending),
            attempt,
        });
    }

    fn issue_quote(&mut self, symbol: &Symbol, attempt: u32) -> RequestSeq {
        let pending = self.source.fetch_quotes(std::slice::from_ref(symbol));
        let seq = pending.seq();
        self.in_flight.push(InFlight {
            request: Request::Quote(pending),
            attempt,
        });
        seq
    }

    fn issue_history(&mut self, symbol: &Symbol, range: TimeRange, attempt: u32) -> RequestSeq {
        let pending = self.source.fetch_history(symbol, range);
        let seq = pending.seq();
        self.in_flight.push(InFlight {
            request: Request::History(pending),
            attempt,
        });
        seq
    }

    fn issue_profile(&mut self, symbol: &Symbol, attempt: u32) -> RequestSeq {
        let pending = self.source.fetch_profile(symbol);
        let seq = pending.seq();
        self.in_flight.push(InFlight {
            request: Request::Profile(pending),
            attempt,
        });
        seq
    }

    fn open_detail(&mut self, symbol: Symbol) {
        let range = self.detail.as_ref().map(DetailState::range).unwrap_or_default();
        let requests = DetailRequests {
            quote: self.issue_quote(&symbol, 1),
            history: self.issue_history(&symbol, range, 1),
            profile: self.issue_profile(&symbol, 1),
        };
        self.detail = Some(DetailState::open(symbol, range, requests));
    }

    /// Moves the search results to `page`; ignored outside the search view.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        matches!(self.route, Route::Search(_)) && self.search.set_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        matches!(self.route, Route::Search(_)) && self.search.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        matches!(self.route, Route::Search(_)) && self.search.previous_page()
    }

    /// Changes the detail chart range and requests the new series.
    pub fn change_range(&mut self, range: TimeRange) -> Result<()> {
        let symbol = self.current_symbol()?;
        let seq = self.issue_history(&symbol, range, 1);
        if let Some(detail) = self.detail.as_mut() {
            detail.change_range(range, seq);
        }
        Ok(())
    }

    pub fn add_to_watchlist(&mut self, raw: &str) -> bool {
        self.watchlist
            .add(raw, &self.catalog, self.provider.as_mut())
            .is_some()
    }

    pub fn remove_from_watchlist(&mut self, raw: &str) -> bool {
        self.watchlist.remove(raw)
    }

    /// Flips watchlist membership of the symbol on the detail view. Returns
    /// whether it is on the watchlist afterwards.
    pub fn toggle_watchlist(&mut self) -> Result<bool> {
        let symbol = self.current_symbol()?;
        Ok(self
            .watchlist
            .toggle(symbol.as_str(), &self.catalog, self.provider.as_mut()))
    }

    fn current_symbol(&self) -> Result<Symbol> {
        self.detail
            .as_ref()
            .map(|detail| detail.symbol().clone())
            .ok_or_else(|| MarketError::Format("no stock is open".to_string()))
    }

    /// Applies the response of `in_flight()[index]`. Returns whether anything
    /// the current view shows changed, notices included.
    pub fn complete(&mut self, index: usize, arrival: Arrival) -> bool {
        if index >= self.in_flight.len() {
            warn!("Response for unknown request slot {}", index);
            return false;
        }
        let flight = self.in_flight.remove(index);
        self.apply(arrival, flight.attempt)
    }

    /// Blocks until every request in flight, retries included, is answered.
    pub fn settle(&mut self) {
        while !self.in_flight.is_empty() {
            let flight = self.in_flight.remove(0);
            let attempt = flight.attempt;
            let arrival = flight.wait();
            self.apply(arrival, attempt);
        }
    }

    fn apply(&mut self, arrival: Arrival, attempt: u32) -> bool {
        let (kind, outcome) = match arrival {
            Arrival::Search(seq, result) => (Kind::Search, self.search.resolve(seq, result)),
            Arrival::Quote(seq, result) => (Kind::Quote, self.apply_quote(seq, result)),
            Arrival::History(seq, result) => (Kind::History, self.apply_history(seq, result)),
            Arrival::Profile(seq, result) => (Kind::Profile, self.apply_profile(seq, result)),
        };
        let what = kind.label();
        let Err(error) = outcome else {
            return true;
        };
        if error.is_silent() {
            debug!("{} response dropped: {}", what, error);
            false
        } else if error.is_retryable() && attempt < MAX_FETCH_ATTEMPTS {
            warn!("{} attempt {} failed: {}; retrying", what, attempt, error);
            self.retry(kind, attempt + 1);
            false
        } else {
            self.notices.push(match error {
                MarketError::TransientFetchFailure(_) => {
                    format!("Could not load {what} after {attempt} attempt(s): {error}")
                }
                other => other.to_string(),
            });
            true
        }
    }

    fn apply_quote(&mut self, seq: RequestSeq, result: Result<Vec<Quote>>) -> Result<()> {
        let Some(detail) = self.detail.as_mut() else {
            return Err(MarketError::RequestSuperseded { seq: seq.0, latest: 0 });
        };
        let symbol = detail.symbol().clone();
        let result = match result.and_then(|quotes| {
            quotes
                .into_iter()
                .next()
                .ok_or_else(|| MarketError::NotFound(symbol.to_string()))
        }) {
            // Watchlist entries added by hand are unknown to the data source.
            Err(MarketError::NotFound(missing)) => self
                .watchlist
                .get(&missing)
                .map(|entry| entry.quote.clone())
                .ok_or(MarketError::NotFound(missing)),
            other => other,
        };
        detail.resolve_quote(seq, result)
    }

    fn apply_history(&mut self, seq: RequestSeq, result: Result<Vec<PricePoint>>) -> Result<()> {
        let Some(detail) = self.detail.as_mut() else {
            return Err(MarketError::RequestSuperseded { seq: seq.0, latest: 0 });
        };
        let result = result.map_err(|error| match error {
            MarketError::NotFound(symbol) => MarketError::NotFound(format!("{symbol} (no price history)")),
            other => other,
        });
        detail.resolve_history(seq, result)
    }

    fn apply_profile(&mut self, seq: RequestSeq, result: Result<CompanyProfile>) -> Result<()> {
        let Some(detail) = self.detail.as_mut() else {
            return Err(MarketError::RequestSuperseded { seq: seq.0, latest: 0 });
        };
        match detail.resolve_profile(seq, result) {
            // The quote response already reports an unknown symbol.
            Err(MarketError::NotFound(symbol)) => {
                debug!("No company profile for {}", symbol);
                Ok(())
            }
            other => other,
        }
    }

    fn retry(&mut self, kind: Kind, attempt: u32) {
        match kind {
            Kind::Search => {
                let query = self.search.query().to_string();
                self.issue_search(&query, attempt);
            }
            Kind::Quote => {
                if let Ok(symbol) = self.current_symbol() {
                    let seq = self.issue_quote(&symbol, attempt);
                    if let Some(detail) = self.detail.as_mut() {
                        detail.retry_quote(seq);
                    }
                }
            }
            Kind::History => {
                if let Some((symbol, range)) = self.detail.as_ref().map(|d| (d.symbol().clone(), d.range())) {
                    let seq = self.issue_history(&symbol, range, attempt);
                    if let Some(detail) = self.detail.as_mut() {
                        detail.change_range(range, seq);
                    }
                }
            }
            Kind::Profile => {
                if let Ok(symbol) = self.current_symbol() {
                    let seq = self.issue_profile(&symbol, attempt);
                    if let Some(detail) = self.detail.as_mut() {
                        detail.retry_profile(seq);
                    }
                }
            }
        }
    }

    /// Index levels followed by the watchlist, for the ticker tape.
    pub fn ticker_items(&self) -> Vec<TickerItem> {
        let mut items = market_indices();
        items.extend(self.watchlist.entries().iter().map(|entry| TickerItem::from(&entry.quote)));
        items
    }

    /// Read-only snapshot of the current route.
    pub fn view(&self) -> View {
        match &self.route {
            Route::Home => View::Home(HomeView {
                tape: self.ticker_items(),
                top_gainers: self.catalog.top_gainers(MOVERS_LEN),
                top_losers: self.catalog.top_losers(MOVERS_LEN),
                news: market_news(Utc::now().date_naive()),
            }),
            Route::Search(_) => View::Search(self.search.view()),
            Route::Stock(symbol) => match &self.detail {
                Some(detail) => View::Stock(detail.view(self.watchlist.contains(detail.symbol().as_str()))),
                None => View::NotFound { path: symbol.link() },
            },
            Route::Watchlist => View::Watchlist {
                entries: self.watchlist.entries().to_vec(),
            },
            Route::Auth => View::Auth,
            Route::NotFound(path) => View::NotFound { path: path.clone() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_common::config::FeedSettings;
    use stock_common::provider::FixedQuoteProvider;
    use stock_feed::SimulatedFeed;

    fn browser_with(settings: FeedSettings, roll: f64) -> Browser<SimulatedFeed> {
        let catalog = Arc::new(CatalogStore::default());
        let feed_provider = Box::new(FixedQuoteProvider {
            roll,
            ..FixedQuoteProvider::default()
        });
        let feed = SimulatedFeed::with_provider(Arc::clone(&catalog), settings, feed_provider);
        let mut provider = FixedQuoteProvider::default();
        let watchlist = WatchlistStore::seeded(&catalog, &mut provider);
        Browser::new(feed, catalog, Box::new(provider), watchlist, 5)
    }

    fn browser() -> Browser<SimulatedFeed> {
        browser_with(FeedSettings::instant(), 1.0)
    }

    /// Selects on one in-flight request the way the event loop does.
    fn wait_for(browser: &Browser<SimulatedFeed>, index: usize) -> Arrival {
        let mut select = Select::new();
        let registered = browser.in_flight()[index].register(&mut select);
        let operation = select.select();
        assert_eq!(operation.index(), registered);
        browser.in_flight()[index].receive(operation)
    }

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    #[test]
    fn search_route_loads_results() {
        let mut browser = browser();
        browser.navigate(route("/search?q=inc"));
        assert!(browser.is_loading());
        browser.settle();
        let View::Search(view) = browser.view() else {
            panic!("expected the search view");
        };
        assert!(!view.loading);
        assert_eq!(view.total_results, 8);
        assert_eq!(view.items.len(), 5);
        assert_eq!(view.navigation.total_pages, 2);
        assert!(browser.next_page());
        let View::Search(view) = browser.view() else {
            panic!("expected the search view");
        };
        assert_eq!(view.items.len(), 3);
    }

    #[test]
    fn superseded_search_is_silent() {
        let mut browser = browser();
        browser.navigate(route("/search?q=apple"));
        browser.navigate(route("/search?q=corp"));
        browser.settle();
        assert!(browser.take_notices().is_empty());
        let View::Search(view) = browser.view() else {
            panic!("expected the search view");
        };
        assert_eq!(view.query, "corp");
        assert_eq!(view.total_results, 3);
    }

    #[test]
    fn detail_loads_quote_and_history() {
        let mut browser = browser();
        browser.navigate(route("/stock/nvda"));
        browser.settle();
        let View::Stock(view) = browser.view() else {
            panic!("expected the detail view");
        };
        assert_eq!(view.quote.unwrap().price, 900.50);
        assert!(view.points > 20);
        assert!(!view.in_watchlist);
        let profile = view.profile.unwrap();
        assert_eq!(profile.fundamentals.pe_ratio, 20.0);
        assert_eq!(profile.trading.unwrap().avg_volume, 1_000_000);

        assert!(browser.toggle_watchlist().unwrap());
        browser.change_range(TimeRange::All).unwrap();
        browser.settle();
        let View::Stock(view) = browser.view() else {
            panic!("expected the detail view");
        };
        assert!(view.in_watchlist);
        assert_eq!(view.range, TimeRange::All);
        assert_eq!(view.points, 365);
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let mut browser = browser();
        browser.navigate(route("/stock/ZZZZ"));
        browser.settle();
        let notices = browser.take_notices();
        assert!(notices.iter().any(|n| n == "Symbol not found: ZZZZ"));
    }

    #[test]
    fn hand_added_symbol_uses_watchlist_quote() {
        let mut browser = browser();
        assert!(browser.add_to_watchlist("rivn"));
        assert!(!browser.add_to_watchlist("RIVN"));
        browser.navigate(route("/stock/RIVN"));
        browser.settle();
        let View::Stock(view) = browser.view() else {
            panic!("expected the detail view");
        };
        assert_eq!(view.quote.unwrap().name, "RIVN Company");
        assert!(view.in_watchlist);
        assert!(view.profile.is_none());
        assert!(!view.loading);
        let notices = browser.take_notices();
        assert_eq!(notices, ["Symbol not found: RIVN (no price history)"]);
    }

    #[test]
    fn transient_failures_are_retried_then_reported() {
        let settings = FeedSettings {
            failure_rate: 0.5,
            ..FeedSettings::instant()
        };
        let mut browser = browser_with(settings, 0.0);
        browser.navigate(route("/search?q=apple"));
        browser.settle();
        let notices = browser.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("after 3 attempt(s)"));
    }

    #[test]
    fn leaving_detail_drops_its_responses() {
        let mut browser = browser();
        browser.navigate(route("/stock/AAPL"));
        browser.navigate(route("/watchlist"));
        browser.settle();
        assert!(browser.take_notices().is_empty());
        let View::Watchlist { entries } = browser.view() else {
            panic!("expected the watchlist view");
        };
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn home_shows_indices_then_watchlist() {
        let browser = browser();
        let View::Home(home) = browser.view() else {
            panic!("expected the home view");
        };
        let symbols: Vec<&str> = home.tape.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["DJIA", "S&P 500", "NASDAQ", "AAPL", "MSFT", "GOOGL"]);
        assert_eq!(home.top_gainers[0].symbol.as_str(), "NVDA");
        assert_eq!(home.top_losers[0].symbol.as_str(), "PFE");
        assert_eq!(home.news[0].title, "Major Index Hits Record High");
    }

    #[test]
    fn completion_reports_visible_changes() {
        let mut browser = browser();
        browser.navigate(route("/search?q=apple"));
        browser.navigate(route("/search?q=corp"));
        let stale = wait_for(&browser, 0);
        assert!(matches!(stale, Arrival::Search(RequestSeq(1), _)));
        assert!(!browser.complete(0, stale));
        let current = wait_for(&browser, 0);
        assert!(browser.complete(0, current));
        assert!(!browser.is_loading());
        assert!(!browser.complete(3, Arrival::Search(RequestSeq(99), Ok(Vec::new()))));
    }

    #[test]
    fn page_commands_only_apply_to_search() {
        let mut browser = browser();
        browser.navigate(route("/watchlist"));
        assert!(!browser.next_page());
        assert!(!browser.go_to_page(2));
        assert!(browser.change_range(TimeRange::OneDay).is_err());
    }
}
