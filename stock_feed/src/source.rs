//! The asynchronous data-source interface.
//!
//! Every request returns immediately with a `Pending` handle tagged with the
//! request's sequence number; the result shows up on the handle's channel
//! once the source answers. Handles can be waited on directly or registered
//! in a `crossbeam_channel::Select` next to other channels.

use crossbeam_channel::Receiver;
use stock_common::history::TimeRange;
use stock_common::{CompanyProfile, PricePoint, Quote, RequestSeq, Result, Symbol};

/// Market data capability consumed by the browser.
pub trait DataSource {
    /// Current quotes for `symbols`, in the requested order. Fails with
    /// `NotFound` for the first unknown symbol.
    fn fetch_quotes(&self, symbols: &[Symbol]) -> Pending<Vec<Quote>>;

    /// Daily history for `symbol` restricted to `range`, oldest first.
    fn fetch_history(&self, symbol: &Symbol, range: TimeRange) -> Pending<Vec<PricePoint>>;

    /// Fundamentals, trading statistics, and news for `symbol`. Fails with
    /// `NotFound` outside the catalog.
    fn fetch_profile(&self, symbol: &Symbol) -> Pending<CompanyProfile>;

    /// Quotes matching `query` (see `stock_common::search::search`).
    fn search(&self, query: &str) -> Pending<Vec<Quote>>;
}

/// An in-flight request.
#[derive(Debug)]
pub struct Pending<T> {
    seq: RequestSeq,
    rx: Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Handle for request `seq`, answered on `rx`.
    pub fn new(seq: RequestSeq, rx: Receiver<Result<T>>) -> Self {
        Pending { seq, rx }
    }

    /// Sequence number the request was issued under.
    pub fn seq(&self) -> RequestSeq {
        self.seq
    }

    /// Channel the result arrives on.
    pub fn receiver(&self) -> &Receiver<Result<T>> {
        &self.rx
    }

    /// Blocks until the source answers.
    pub fn wait(self) -> Result<T> {
        self.rx.recv()?
    }
}
