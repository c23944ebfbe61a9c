//! Quote data model and the view-models derived from it.
//!
//! A `Quote` is a symbol's current price/change snapshot. `WatchlistEntry` and
//! `TickerItem` are the shapes handed to the presentation layer; `PricePoint`
//! is one day of history.

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Current price/change snapshot for a single symbol.
///
/// `change_percent` is informational; it is not required to equal
/// `change / price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Company display name.
    pub name: String,
    /// Last price, never negative.
    pub price: f64,
    /// Absolute change since the previous close.
    pub change: f64,
    /// Relative change since the previous close, in percent.
    pub change_percent: f64,
}

impl Quote {
    /// Builds a quote, clamping a negative price to zero.
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
    ) -> Self {
        Quote {
            symbol,
            name: name.into(),
            price: price.max(0.0),
            change,
            change_percent,
        }
    }

    /// Detail route for this quote.
    pub fn link(&self) -> String {
        self.symbol.link()
    }
}

/// A quote tracked in the watchlist, with its detail link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    /// Snapshot shown for the entry.
    #[serde(flatten)]
    pub quote: Quote,
    /// Detail route, `/stock/{SYMBOL}`.
    pub link_to: String,
}

impl From<Quote> for WatchlistEntry {
    fn from(quote: Quote) -> Self {
        let link_to = quote.link();
        WatchlistEntry { quote, link_to }
    }
}

/// One entry of the scrolling ticker tape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerItem {
    /// Symbol or index label (e.g. `S&P 500`), shown verbatim.
    pub symbol: String,
    /// Last price.
    pub price: f64,
    /// Absolute change.
    pub change: f64,
    /// Relative change in percent.
    pub change_percent: f64,
}

impl From<&Quote> for TickerItem {
    fn from(quote: &Quote) -> Self {
        TickerItem {
            symbol: quote.symbol.to_string(),
            price: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
        }
    }
}

/// Daily history point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// UTC timestamp in milliseconds since Unix epoch.
    pub timestamp: i64,
    /// Closing price.
    pub price: f64,
    /// Opening price.
    pub open: f64,
    /// Intraday high.
    pub high: f64,
    /// Intraday low.
    pub low: f64,
    /// Traded volume.
    pub volume: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> Quote {
        Quote::new(Symbol::new("aapl").unwrap(), "Apple Inc.", 170.34, 1.12, 0.66)
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&apple()).unwrap();
        assert!(json.contains("\"changePercent\":0.66"));
        assert!(json.contains("\"symbol\":\"AAPL\""));
    }

    #[test]
    fn watchlist_entry_links_to_detail() {
        let entry = WatchlistEntry::from(apple());
        assert_eq!(entry.link_to, "/stock/AAPL");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["linkTo"], "/stock/AAPL");
        assert_eq!(json["name"], "Apple Inc.");
    }

    #[test]
    fn negative_price_is_clamped() {
        let quote = Quote::new(Symbol::new("X").unwrap(), "X", -3.0, -1.0, -0.5);
        assert_eq!(quote.price, 0.0);
        assert_eq!(quote.change, -1.0);
    }
}
