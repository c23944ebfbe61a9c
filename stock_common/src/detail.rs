//! State behind the per-symbol detail view.
//!
//! The view waits on three requests: a quote, a history series, and the
//! company profile. Each is tracked by its own sequence number so that
//! switching symbol or chart range drops whatever was still in flight.

use log::{debug, info};
use serde::Serialize;

use crate::error::MarketError;
use crate::history::{HistorySummary, TimeRange};
use crate::profile::CompanyProfile;
use crate::quote::{PricePoint, Quote};
use crate::request::RequestSeq;
use crate::result::Result;
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    latest: RequestSeq,
    loading: bool,
}

impl Slot {
    fn pending(latest: RequestSeq) -> Self {
        Slot { latest, loading: true }
    }

    fn accept(&mut self, seq: RequestSeq, what: &str) -> Result<()> {
        if !self.loading || self.latest != seq {
            debug!("Discarding {} response {} (latest {})", what, seq, self.latest);
            return Err(MarketError::RequestSuperseded {
                seq: seq.0,
                latest: self.latest.0,
            });
        }
        self.loading = false;
        Ok(())
    }
}

/// Detail view for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    symbol: Symbol,
    range: TimeRange,
    quote: Option<Quote>,
    history: Vec<PricePoint>,
    profile: Option<CompanyProfile>,
    quote_slot: Slot,
    history_slot: Slot,
    profile_slot: Slot,
}

/// Sequence numbers of the requests that open a detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequests {
    /// Quote request.
    pub quote: RequestSeq,
    /// History request for the initial range.
    pub history: RequestSeq,
    /// Company profile request.
    pub profile: RequestSeq,
}

impl DetailState {
    /// Opens the view for `symbol`; every request starts out pending.
    pub fn open(symbol: Symbol, range: TimeRange, requests: DetailRequests) -> Self {
        info!("Loading detail for {} ({})", symbol, range);
        DetailState {
            symbol,
            range,
            quote: None,
            history: Vec::new(),
            profile: None,
            quote_slot: Slot::pending(requests.quote),
            history_slot: Slot::pending(requests.history),
            profile_slot: Slot::pending(requests.profile),
        }
    }

    /// Symbol on display.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Selected chart range.
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Latest applied quote.
    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    /// Series for the selected range, oldest first.
    pub fn history(&self) -> &[PricePoint] {
        &self.history
    }

    /// Fundamentals, statistics, and news, once loaded.
    pub fn profile(&self) -> Option<&CompanyProfile> {
        self.profile.as_ref()
    }

    /// `true` while any of the three requests is outstanding.
    pub fn is_loading(&self) -> bool {
        self.quote_slot.loading || self.history_slot.loading || self.profile_slot.loading
    }

    /// Switches the chart range; the current series is kept until the new one
    /// arrives.
    pub fn change_range(&mut self, range: TimeRange, history_seq: RequestSeq) {
        self.range = range;
        self.history_slot = Slot::pending(history_seq);
    }

    /// Re-issues the quote request after a failed attempt.
    pub fn retry_quote(&mut self, quote_seq: RequestSeq) {
        self.quote_slot = Slot::pending(quote_seq);
    }

    /// Re-issues the profile request after a failed attempt.
    pub fn retry_profile(&mut self, profile_seq: RequestSeq) {
        self.profile_slot = Slot::pending(profile_seq);
    }

    /// Applies a quote response.
    pub fn resolve_quote(&mut self, seq: RequestSeq, response: Result<Quote>) -> Result<()> {
        self.quote_slot.accept(seq, "quote")?;
        self.quote = Some(response?);
        Ok(())
    }

    /// Applies a history response.
    pub fn resolve_history(&mut self, seq: RequestSeq, response: Result<Vec<PricePoint>>) -> Result<()> {
        self.history_slot.accept(seq, "history")?;
        self.history = response?;
        Ok(())
    }

    /// Applies a company profile response.
    pub fn resolve_profile(&mut self, seq: RequestSeq, response: Result<CompanyProfile>) -> Result<()> {
        self.profile_slot.accept(seq, "profile")?;
        self.profile = Some(response?);
        Ok(())
    }

    /// Read-only snapshot for the presentation layer.
    pub fn view(&self, in_watchlist: bool) -> DetailView {
        DetailView {
            symbol: self.symbol.clone(),
            range: self.range,
            loading: self.is_loading(),
            quote: self.quote.clone(),
            summary: HistorySummary::of(&self.history),
            points: self.history.len(),
            profile: self.profile.clone(),
            in_watchlist,
        }
    }
}

/// What the detail view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    /// Symbol on display.
    pub symbol: Symbol,
    /// Selected chart range.
    pub range: TimeRange,
    /// `true` while any request is outstanding.
    pub loading: bool,
    /// Latest quote, if one arrived.
    pub quote: Option<Quote>,
    /// Summary of the selected range.
    pub summary: Option<HistorySummary>,
    /// Number of points in the selected range.
    pub points: usize,
    /// Fundamentals, statistics, and news.
    pub profile: Option<CompanyProfile>,
    /// Whether the symbol is on the watchlist.
    pub in_watchlist: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Fundamentals;

    fn aapl() -> Quote {
        Quote::new(Symbol::new("AAPL").unwrap(), "Apple Inc.", 170.34, 1.12, 0.66)
    }

    fn point(timestamp: i64, price: f64) -> PricePoint {
        PricePoint { timestamp, price, open: price, high: price, low: price, volume: 10 }
    }

    fn open() -> DetailState {
        let requests = DetailRequests { quote: RequestSeq(1), history: RequestSeq(2), profile: RequestSeq(3) };
        DetailState::open(Symbol::new("aapl").unwrap(), TimeRange::OneMonth, requests)
    }

    fn profile() -> CompanyProfile {
        let fundamentals =
            Fundamentals { market_cap: 2.6e12, pe_ratio: 28.5, eps: 6.0, dividend_yield: 0.55, beta: 1.29 };
        let today = chrono::NaiveDate::from_ymd_opt(2024, 9, 13).unwrap();
        CompanyProfile::new(&aapl(), fundamentals, &[point(0, 170.0)], today)
    }

    #[test]
    fn loads_quote_and_history() {
        let mut state = open();
        assert!(state.is_loading());
        state.resolve_quote(RequestSeq(1), Ok(aapl())).unwrap();
        assert!(state.is_loading());
        state
            .resolve_history(RequestSeq(2), Ok(vec![point(0, 1.0), point(1, 2.0)]))
            .unwrap();
        assert!(state.is_loading());
        state.resolve_profile(RequestSeq(3), Ok(profile())).unwrap();
        assert!(!state.is_loading());
        let view = state.view(true);
        assert_eq!(view.quote.unwrap().name, "Apple Inc.");
        assert_eq!(view.points, 2);
        assert_eq!(view.summary.unwrap().last, 2.0);
        assert_eq!(view.profile.unwrap().fundamentals.pe_ratio, 28.5);
        assert!(view.in_watchlist);
    }

    #[test]
    fn range_change_discards_older_series() {
        let mut state = open();
        state.change_range(TimeRange::OneYear, RequestSeq(4));
        let stale = state.resolve_history(RequestSeq(2), Ok(vec![point(0, 1.0)]));
        assert!(matches!(stale, Err(MarketError::RequestSuperseded { seq: 2, latest: 4 })));
        assert!(state.history().is_empty());
        state.resolve_history(RequestSeq(4), Ok(vec![point(0, 5.0)])).unwrap();
        assert_eq!(state.history()[0].price, 5.0);
        assert_eq!(state.range(), TimeRange::OneYear);
    }

    #[test]
    fn duplicate_response_is_discarded() {
        let mut state = open();
        state.resolve_quote(RequestSeq(1), Ok(aapl())).unwrap();
        assert!(state.resolve_quote(RequestSeq(1), Ok(aapl())).is_err());
    }

    #[test]
    fn not_found_is_reported() {
        let mut state = open();
        let err = state
            .resolve_quote(RequestSeq(1), Err(MarketError::NotFound("AAPL".into())))
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
        assert!(state.quote().is_none());
        state.retry_quote(RequestSeq(5));
        state.resolve_quote(RequestSeq(5), Ok(aapl())).unwrap();
        assert!(state.quote().is_some());
    }

    #[test]
    fn profile_retry_discards_the_failed_attempt() {
        let mut state = open();
        let failed = state.resolve_profile(RequestSeq(3), Err(MarketError::TransientFetchFailure("boom".into())));
        assert!(failed.unwrap_err().is_retryable());
        state.retry_profile(RequestSeq(6));
        assert!(state.resolve_profile(RequestSeq(3), Ok(profile())).is_err());
        state.resolve_profile(RequestSeq(6), Ok(profile())).unwrap();
        assert_eq!(state.profile().unwrap().news.len(), 3);
        assert!(state.profile().unwrap().trading.is_some());
    }
}
