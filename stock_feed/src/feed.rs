//! Simulated market data source.
//!
//! `SimulatedFeed` answers every request on its own short-lived thread after a
//! fixed delay, standing in for a remote API. Because each request sleeps
//! independently, responses may arrive in a different order than the requests
//! were made; callers compare sequence numbers to drop stale ones.
//!
//! Design notes:
//! - The catalog is shared read-only through an `Arc`.
//! - Placeholder data comes from one `QuoteProvider` behind a `Mutex`, so a
//!   seeded run is reproducible as long as requests resolve in order.
//! - History is generated once per symbol and cached, so switching chart
//!   range shows slices of the same series. Fundamentals are cached the same
//!   way; a profile's 52-week figures come from the cached series.
//! - `failure_rate` injects `TransientFetchFailure` responses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::bounded;
use log::{debug, warn};
use stock_common::config::{FeedSettings, HISTORY_DAYS};
use stock_common::history::TimeRange;
use stock_common::profile::Fundamentals;
use stock_common::provider::{QuoteProvider, RandomQuoteProvider};
use stock_common::request::RequestSequencer;
use stock_common::{CatalogStore, CompanyProfile, MarketError, PricePoint, Quote, Result, Symbol};

use crate::source::{DataSource, Pending};

/// State shared with the request threads.
struct Shared {
    catalog: Arc<CatalogStore>,
    provider: Mutex<Box<dyn QuoteProvider>>,
    histories: Mutex<HashMap<Symbol, Vec<PricePoint>>>,
    fundamentals: Mutex<HashMap<Symbol, Fundamentals>>,
    failure_rate: f64,
}

impl Shared {
    /// Fails the request with the configured probability.
    fn inject_failure(&self) -> Result<()> {
        if self.failure_rate <= 0.0 {
            return Ok(());
        }
        let roll = self.provider.lock()?.roll();
        if roll < self.failure_rate {
            return Err(MarketError::TransientFetchFailure(
                "simulated data source unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn quotes(&self, symbols: &[Symbol]) -> Result<Vec<Quote>> {
        symbols
            .iter()
            .map(|symbol| {
                self.catalog
                    .get(symbol)
                    .cloned()
                    .ok_or_else(|| MarketError::NotFound(symbol.to_string()))
            })
            .collect()
    }

    fn listed(&self, symbol: &Symbol) -> Result<&Quote> {
        self.catalog
            .get(symbol)
            .ok_or_else(|| MarketError::NotFound(symbol.to_string()))
    }

    /// Calls `f` with the full cached series of `symbol`, generating it first
    /// if needed.
    fn with_series<R>(&self, symbol: &Symbol, now: DateTime<Utc>, f: impl FnOnce(&[PricePoint]) -> R) -> Result<R> {
        let mut histories = self.histories.lock()?;
        if !histories.contains_key(symbol) {
            let series = self.provider.lock()?.history(HISTORY_DAYS, now);
            histories.insert(symbol.clone(), series);
        }
        let series = histories.get(symbol).map(Vec::as_slice).unwrap_or_default();
        Ok(f(series))
    }

    fn history(&self, symbol: &Symbol, range: TimeRange) -> Result<Vec<PricePoint>> {
        self.listed(symbol)?;
        let now = Utc::now();
        self.with_series(symbol, now, |series| range.filter(series, now))
    }

    fn profile(&self, symbol: &Symbol) -> Result<CompanyProfile> {
        let quote = self.listed(symbol)?;
        let cached = self.fundamentals.lock()?.get(symbol).cloned();
        let fundamentals = match cached {
            Some(fundamentals) => fundamentals,
            None => {
                let fundamentals = self.provider.lock()?.fundamentals(quote);
                self.fundamentals.lock()?.insert(symbol.clone(), fundamentals.clone());
                fundamentals
            }
        };
        let now = Utc::now();
        self.with_series(symbol, now, |series| {
            CompanyProfile::new(quote, fundamentals, series, now.date_naive())
        })
    }
}

/// Data source serving the in-memory catalog with artificial latency.
pub struct SimulatedFeed {
    shared: Arc<Shared>,
    sequencer: RequestSequencer,
    search_delay: Duration,
    detail_delay: Duration,
}

impl SimulatedFeed {
    /// Feed over `catalog` with placeholder data seeded from `settings`.
    pub fn new(catalog: Arc<CatalogStore>, settings: FeedSettings) -> Self {
        let provider = Box::new(RandomQuoteProvider::with_seed(settings.seed));
        Self::with_provider(catalog, settings, provider)
    }

    /// Feed drawing placeholder data from `provider`.
    pub fn with_provider(
        catalog: Arc<CatalogStore>,
        settings: FeedSettings,
        provider: Box<dyn QuoteProvider>,
    ) -> Self {
        if !(0.0..=1.0).contains(&settings.failure_rate) {
            warn!(
                "Failure rate {} outside [0, 1]; it will be clamped",
                settings.failure_rate
            );
        }
        SimulatedFeed {
            shared: Arc::new(Shared {
                catalog,
                provider: Mutex::new(provider),
                histories: Mutex::new(HashMap::new()),
                fundamentals: Mutex::new(HashMap::new()),
                failure_rate: settings.failure_rate.clamp(0.0, 1.0),
            }),
            sequencer: RequestSequencer::new(),
            search_delay: settings.search_delay,
            detail_delay: settings.detail_delay,
        }
    }

    /// Catalog served by this feed.
    pub fn catalog(&self) -> &CatalogStore {
        &self.shared.catalog
    }

    /// Runs `job` on a new thread after `delay` and returns its handle.
    fn dispatch<T, F>(&self, kind: &'static str, delay: Duration, job: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&Shared) -> Result<T> + Send + 'static,
    {
        let seq = self.sequencer.issue();
        let (tx, rx) = bounded(1);
        let shared = Arc::clone(&self.shared);
        debug!("Dispatching {} request {}", kind, seq);

        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let result = shared.inject_failure().and_then(|_| job(&shared));
            if let Err(e) = &result {
                debug!("{} request {} failed: {}", kind, seq, e);
            }
            if tx.send(result).is_err() {
                debug!("{} request {} abandoned before completion", kind, seq);
            }
        });
        Pending::new(seq, rx)
    }
}

impl DataSource for SimulatedFeed {
    fn fetch_quotes(&self, symbols: &[Symbol]) -> Pending<Vec<Quote>> {
        let symbols = symbols.to_vec();
        self.dispatch("quotes", self.detail_delay, move |shared| shared.quotes(&symbols))
    }

    fn fetch_history(&self, symbol: &Symbol, range: TimeRange) -> Pending<Vec<PricePoint>> {
        let symbol = symbol.clone();
        self.dispatch("history", self.detail_delay, move |shared| {
            shared.history(&symbol, range)
        })
    }

    fn fetch_profile(&self, symbol: &Symbol) -> Pending<CompanyProfile> {
        let symbol = symbol.clone();
        self.dispatch("profile", self.detail_delay, move |shared| shared.profile(&symbol))
    }

    fn search(&self, query: &str) -> Pending<Vec<Quote>> {
        let query = query.to_string();
        self.dispatch("search", self.search_delay, move |shared| {
            Ok(shared.catalog.search(&query))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_common::provider::FixedQuoteProvider;

    fn feed() -> SimulatedFeed {
        SimulatedFeed::new(Arc::new(CatalogStore::default()), FeedSettings::instant())
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn search_runs_the_query_engine() {
        let results = feed().search("corp").wait().unwrap();
        let symbols: Vec<&str> = results.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, ["MSFT", "NVDA", "INTC"]);
    }

    #[test]
    fn quotes_in_request_order() {
        let quotes = feed().fetch_quotes(&[sym("tsla"), sym("AAPL")]).wait().unwrap();
        assert_eq!(quotes[0].symbol.as_str(), "TSLA");
        assert_eq!(quotes[1].symbol.as_str(), "AAPL");
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        let feed = feed();
        let err = feed.fetch_quotes(&[sym("AAPL"), sym("NOPE")]).wait().unwrap_err();
        assert!(matches!(err, MarketError::NotFound(ref s) if s == "NOPE"));
        let err = feed.fetch_history(&sym("NOPE"), TimeRange::All).wait().unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
        let err = feed.fetch_profile(&sym("NOPE")).wait().unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
    }

    #[test]
    fn profile_uses_the_cached_year() {
        let feed = feed();
        let year = feed.fetch_history(&sym("MSFT"), TimeRange::All).wait().unwrap();
        let profile = feed.fetch_profile(&sym("msft")).wait().unwrap();
        let trading = profile.trading.unwrap();
        let high = year.iter().map(|p| p.high).fold(f64::MIN, f64::max);
        assert_eq!(trading.high_52_week, high);
        assert_eq!(trading.volume, year.last().unwrap().volume);
        assert_eq!(profile.news.len(), 3);
        assert!(profile.description.contains("Microsoft"));

        let again = feed.fetch_profile(&sym("MSFT")).wait().unwrap();
        assert_eq!(again.fundamentals, profile.fundamentals);
    }

    #[test]
    fn history_is_cached_per_symbol() {
        let feed = feed();
        let year = feed.fetch_history(&sym("AAPL"), TimeRange::All).wait().unwrap();
        let month = feed.fetch_history(&sym("AAPL"), TimeRange::OneMonth).wait().unwrap();
        assert_eq!(year.len(), HISTORY_DAYS as usize);
        assert!(month.len() < year.len());
        assert_eq!(month.last(), year.last());
    }

    #[test]
    fn sequence_numbers_increase() {
        let feed = feed();
        let a = feed.search("a");
        let b = feed.fetch_quotes(&[sym("AAPL")]);
        assert!(b.seq() > a.seq());
    }

    #[test]
    fn failure_injection_is_transient() {
        let provider = Box::new(FixedQuoteProvider {
            roll: 0.0,
            ..FixedQuoteProvider::default()
        });
        let settings = FeedSettings {
            failure_rate: 0.5,
            ..FeedSettings::instant()
        };
        let feed = SimulatedFeed::with_provider(Arc::new(CatalogStore::default()), settings, provider);
        let err = feed.search("apple").wait().unwrap_err();
        assert!(err.is_retryable());
    }
}
