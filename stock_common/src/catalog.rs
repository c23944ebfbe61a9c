//! Fixed in-memory catalog of known symbols.
//!
//! The catalog owns its quotes; other stores copy out of it rather than
//! borrowing, so the watchlist can diverge freely.

use std::collections::HashSet;

use log::warn;

use crate::quote::{Quote, TickerItem};
use crate::symbol::Symbol;

/// (symbol, name, price, change, change percent)
type Row = (&'static str, &'static str, f64, f64, f64);

const DEFAULT_ROWS: [Row; 14] = [
    ("AAPL", "Apple Inc.", 170.34, 1.12, 0.66),
    ("MSFT", "Microsoft Corp.", 420.11, -2.05, -0.49),
    ("GOOGL", "Alphabet Inc. Class A", 155.78, 0.90, 0.58),
    ("AMZN", "Amazon.com, Inc.", 180.22, 1.50, 0.84),
    ("TSLA", "Tesla, Inc.", 180.75, 8.10, 4.69),
    ("NVDA", "NVIDIA Corporation", 900.50, 45.20, 5.30),
    ("META", "Meta Platforms, Inc.", 500.00, -5.00, -0.99),
    ("JPM", "JPMorgan Chase & Co.", 200.10, 0.75, 0.38),
    ("V", "Visa Inc.", 280.60, 1.20, 0.43),
    ("JNJ", "Johnson & Johnson", 150.45, -0.50, -0.33),
    ("AMD", "Advanced Micro Devices, Inc.", 175.00, 7.50, 4.48),
    ("PFE", "Pfizer Inc.", 25.50, -1.20, -4.50),
    ("INTC", "Intel Corporation", 30.15, -1.05, -3.37),
    ("DIS", "The Walt Disney Company", 100.80, -2.50, -2.42),
];

const MARKET_INDICES: [(&str, f64, f64, f64); 3] = [
    ("DJIA", 39000.50, 150.25, 0.39),
    ("S&P 500", 5200.75, -20.10, -0.38),
    ("NASDAQ", 16500.00, 75.50, 0.46),
];

/// Ordered list of catalogued quotes, unique by symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStore {
    quotes: Vec<Quote>,
}

impl CatalogStore {
    /// Builds a catalog, keeping the first quote of any repeated symbol.
    pub fn new(quotes: Vec<Quote>) -> Self {
        let mut seen = HashSet::new();
        let quotes = quotes
            .into_iter()
            .filter(|quote| {
                let fresh = seen.insert(quote.symbol.clone());
                if !fresh {
                    warn!("Duplicate catalog symbol {} ignored", quote.symbol);
                }
                fresh
            })
            .collect();
        Self { quotes }
    }

    /// All quotes in catalog order.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of catalogued symbols.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// `true` when nothing is catalogued.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Looks up a quote by symbol.
    pub fn get(&self, symbol: &Symbol) -> Option<&Quote> {
        self.quotes.iter().find(|quote| &quote.symbol == symbol)
    }

    /// Case-insensitive substring search over symbol and name.
    pub fn search(&self, query: &str) -> Vec<Quote> {
        crate::search::search(&self.quotes, query)
    }

    /// Up to `n` quotes with the largest positive `change_percent`, best first.
    pub fn top_gainers(&self, n: usize) -> Vec<Quote> {
        let mut gainers: Vec<Quote> = self
            .quotes
            .iter()
            .filter(|quote| quote.change_percent > 0.0)
            .cloned()
            .collect();
        gainers.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
        gainers.truncate(n);
        gainers
    }

    /// Up to `n` quotes with the most negative `change_percent`, worst first.
    pub fn top_losers(&self, n: usize) -> Vec<Quote> {
        let mut losers: Vec<Quote> = self
            .quotes
            .iter()
            .filter(|quote| quote.change_percent < 0.0)
            .cloned()
            .collect();
        losers.sort_by(|a, b| a.change_percent.total_cmp(&b.change_percent));
        losers.truncate(n);
        losers
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        let quotes = DEFAULT_ROWS
            .iter()
            .filter_map(|&(symbol, name, price, change, change_percent)| {
                Symbol::new(symbol)
                    .ok()
                    .map(|symbol| Quote::new(symbol, name, price, change, change_percent))
            })
            .collect();
        Self::new(quotes)
    }
}

/// Headline index levels shown at the start of the ticker tape.
pub fn market_indices() -> Vec<TickerItem> {
    MARKET_INDICES
        .iter()
        .map(|&(symbol, price, change, change_percent)| TickerItem {
            symbol: symbol.to_string(),
            price,
            change,
            change_percent,
        })
        .collect()
}
