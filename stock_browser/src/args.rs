//! Command-line arguments for the stock browser.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use stock_common::config::{DETAIL_DELAY_MS, FeedSettings, ITEMS_PER_PAGE, SEARCH_DELAY_MS};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Search results shown per page.
    #[clap(long, default_value_t = ITEMS_PER_PAGE)]
    pub page_size: usize,

    /// Simulated latency of search requests, in milliseconds.
    #[clap(long, default_value_t = SEARCH_DELAY_MS)]
    pub search_delay_ms: u64,

    /// Simulated latency of quote and history requests, in milliseconds.
    #[clap(long, default_value_t = DETAIL_DELAY_MS)]
    pub detail_delay_ms: u64,

    /// Seed for placeholder prices and history; random when omitted.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Probability in [0, 1] that a simulated request fails transiently.
    #[clap(long, default_value_t = 0.0)]
    pub failure_rate: f64,

    /// Print views as JSON instead of text.
    #[clap(long)]
    pub json: bool,

    /// Render this route once (e.g. `/search?q=apple`) and exit.
    #[clap(long)]
    pub route: Option<String>,

    /// Text file with the initial watchlist; symbols may be separated by
    /// commas, spaces, or new lines. Defaults to AAPL, MSFT, GOOGL.
    #[clap(long)]
    pub watchlist: Option<PathBuf>,
}

impl Args {
    /// Data-source settings requested on the command line.
    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            search_delay: Duration::from_millis(self.search_delay_ms),
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            failure_rate: self.failure_rate,
            seed: self.seed,
        }
    }
}
