//!
//! Common types and logic shared by the stock feed and the browser.
//!
//! This crate aggregates:
//! - `error` — unified error type `MarketError` used across the workspace.
//! - `result` — handy `Result<T, MarketError>` alias.
//! - `config` — default page size, simulated delays, and other settings.
//! - `symbol` — normalised ticker symbols and list parsing.
//! - `quote` — quotes and the view-models built from them.
//! - `catalog` — the fixed catalog of known symbols.
//! - `search` — the query engine and search-page state.
//! - `detail` — the per-symbol detail-view state.
//! - `pagination` — paging and the page-marker strip.
//! - `watchlist` — the user's watchlist.
//! - `provider` — seedable placeholder data.
//! - `history` — daily history and chart time ranges.
//! - `profile` — company fundamentals, trading statistics, and news.
//! - `request` — request sequence numbers for stale-response detection.
//! - `route` — application routes.
//! - `format` — number formatting for display.
#![warn(missing_docs)]
pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod format;
pub mod history;
pub mod pagination;
pub mod profile;
pub mod provider;
pub mod quote;
pub mod request;
pub mod result;
pub mod route;
pub mod search;
pub mod symbol;
pub mod watchlist;

pub use catalog::CatalogStore;
pub use profile::CompanyProfile;
pub use error::MarketError;
pub use quote::{PricePoint, Quote, TickerItem, WatchlistEntry};
pub use request::RequestSeq;
pub use result::Result;
pub use symbol::Symbol;
