//! Simulated market data for the stock browser.
//!
//! - `source` — the `DataSource` trait and `Pending` request handles.
//! - `feed` — `SimulatedFeed`, which answers requests after an artificial delay.
//! - `tape` — `TapeGenerator`, a background ticker-tape broadcaster.
#![warn(missing_docs)]
pub mod feed;
pub mod source;
pub mod tape;

pub use feed::SimulatedFeed;
pub use source::{DataSource, Pending};
pub use tape::{TapeEvent, TapeGenerator};
