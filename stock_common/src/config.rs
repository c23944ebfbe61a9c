//! Default settings shared by the feed and the browser.
//!
//! The browser's command-line arguments override the run-time values; the
//! remaining constants are fixed.
use std::time::Duration;

/// Number of search results shown per page.
pub const ITEMS_PER_PAGE: usize = 5;
/// Simulated latency of a search request.
pub const SEARCH_DELAY_MS: u64 = 500;
/// Simulated latency of a quote or history request.
pub const DETAIL_DELAY_MS: u64 = 1000;
/// Days of generated history behind every detail view.
pub const HISTORY_DAYS: u32 = 365;
/// Interval between ticker tape updates.
pub const TAPE_INTERVAL_MS: u64 = 500;
/// Attempts made for a request failing with a transient error.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;
/// Symbols present in a fresh watchlist.
pub const DEFAULT_WATCHLIST: [&str; 3] = ["AAPL", "MSFT", "GOOGL"];
/// Number of entries in each of the top gainers / losers lists.
pub const MOVERS_LEN: usize = 3;

/// Run-time settings of the simulated data source.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    /// Delay before a search response is delivered.
    pub search_delay: Duration,
    /// Delay before a quote or history response is delivered.
    pub detail_delay: Duration,
    /// Probability in `[0, 1]` that a request fails transiently.
    pub failure_rate: f64,
    /// Seed for placeholder data; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            search_delay: Duration::from_millis(SEARCH_DELAY_MS),
            detail_delay: Duration::from_millis(DETAIL_DELAY_MS),
            failure_rate: 0.0,
            seed: None,
        }
    }
}

impl FeedSettings {
    /// Settings with no latency and no failures, for tests.
    pub fn instant() -> Self {
        Self {
            search_delay: Duration::ZERO,
            detail_delay: Duration::ZERO,
            failure_rate: 0.0,
            seed: Some(0),
        }
    }
}
