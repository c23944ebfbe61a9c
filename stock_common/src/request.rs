//! Request sequence numbers used to detect stale responses.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Monotonic tag attached to every data-source request and its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestSeq(pub u64);

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing `RequestSeq` values, starting at 1.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    last: AtomicU64,
}

impl RequestSequencer {
    /// Sequencer whose first number is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next sequence number.
    pub fn issue(&self) -> RequestSeq {
        RequestSeq(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
