//! Error types shared across the workspace.
//!
//! `MarketError` unifies the domain failures of the browser (unknown symbol,
//! superseded request, transient data-source failure) with the ambient ones
//! (I/O, JSON, route parsing, channels) so every crate can propagate a single
//! error type with `?`.
use std::io;
use std::sync::PoisonError;

use crossbeam_channel::{RecvError, SendError};
use thiserror::Error;

/// Unified error type shared by the feed and the browser.
#[derive(Error, Debug)]
pub enum MarketError {
    /// The requested symbol is not known to the data source.
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// A newer request of the same kind was issued before this one resolved.
    #[error("Request #{seq} superseded by #{latest}")]
    RequestSuperseded {
        /// Sequence number of the discarded response.
        seq: u64,
        /// Latest sequence number issued at the time of discarding.
        latest: u64,
    },

    /// The data source failed in a way that may succeed on retry.
    #[error("Transient fetch failure: {0}")]
    TransientFetchFailure(String),

    /// Symbol text was empty after normalisation.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Unrecognised time range label.
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// I/O error originating from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A route path could not be parsed as a URL.
    #[error("Route parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Channel send failed (receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (sender closed or timed out); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// A poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl MarketError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketError::TransientFetchFailure(_))
    }

    /// Whether the error is dropped without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, MarketError::RequestSuperseded { .. })
    }
}

impl<T> From<SendError<T>> for MarketError {
    fn from(err: SendError<T>) -> Self {
        MarketError::ChannelSend(err.to_string())
    }
}

impl<T> From<PoisonError<T>> for MarketError {
    fn from(err: PoisonError<T>) -> Self {
        MarketError::MutexLock(err.to_string())
    }
}

impl From<RecvError> for MarketError {
    fn from(err: RecvError) -> Self {
        MarketError::ChannelRecv(err.to_string())
    }
}
