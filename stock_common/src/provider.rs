//! Placeholder market data behind a swappable provider.
//!
//! Everything random in the workspace goes through `QuoteProvider`, so a run
//! can be made reproducible with a seed and tests can plug in fixed values.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::history::generate_history;
use crate::profile::Fundamentals;
use crate::quote::{PricePoint, Quote};
use crate::symbol::Symbol;

/// Source of placeholder quotes, history, and price movement.
pub trait QuoteProvider: Send {
    /// Quote for a symbol the catalog does not know.
    fn placeholder_quote(&mut self, symbol: &Symbol) -> Quote;

    /// `days` daily points ending at `end`.
    fn history(&mut self, days: u32, end: DateTime<Utc>) -> Vec<PricePoint>;

    /// Next tick of a random walk starting at `current_price`.
    fn next_price(&mut self, current_price: f64) -> f64;

    /// Valuation figures consistent with `quote`'s price.
    fn fundamentals(&mut self, quote: &Quote) -> Fundamentals;

    /// Uniform draw in `[0, 1)`, used for failure injection.
    fn roll(&mut self) -> f64;
}

/// Truncates to whole cents, so a value drawn from a half-open range stays
/// inside it.
fn floor_cents(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Provider backed by a seedable `StdRng`.
pub struct RandomQuoteProvider {
    rng: StdRng,
}

impl RandomQuoteProvider {
    /// Deterministic provider; the same seed yields the same data.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Provider seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, from the operating system otherwise.
    pub fn with_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl QuoteProvider for RandomQuoteProvider {
    /// Price in `[20, 520)`, change in `[-5, 5)` and change percent in
    /// `[-2.5, 2.5)`, each truncated to cents.
    fn placeholder_quote(&mut self, symbol: &Symbol) -> Quote {
        let price = floor_cents(self.rng.random_range(20.0..520.0));
        let change = floor_cents(self.rng.random_range(-5.0..5.0));
        let change_percent = floor_cents(self.rng.random_range(-2.5..2.5));
        Quote::new(symbol.clone(), format!("{symbol} Company"), price, change, change_percent)
    }

    fn history(&mut self, days: u32, end: DateTime<Utc>) -> Vec<PricePoint> {
        generate_history(&mut self.rng, days, end)
    }

    /// Moves by a uniform step in `[-1%, +1%)`, never below one cent.
    fn next_price(&mut self, current_price: f64) -> f64 {
        let change: f64 = self.rng.random_range(-0.01..0.01);
        let new_price = current_price * (1.0 + change);
        new_price.max(0.01)
    }

    /// Share count in `[0.5, 16)` billion, P/E in `[8, 45)`, yield in
    /// `[0, 3.5)` and beta in `[0.5, 2)`; EPS is price over P/E.
    fn fundamentals(&mut self, quote: &Quote) -> Fundamentals {
        let shares = self.rng.random_range(0.5e9..16e9);
        let pe_ratio = floor_cents(self.rng.random_range(8.0..45.0));
        Fundamentals {
            market_cap: (quote.price * shares).round(),
            pe_ratio,
            eps: floor_cents(quote.price / pe_ratio),
            dividend_yield: floor_cents(self.rng.random_range(0.0..3.5)),
            beta: floor_cents(self.rng.random_range(0.5..2.0)),
        }
    }

    fn roll(&mut self) -> f64 {
        self.rng.random()
    }
}

/// Provider returning the same values every time.
#[derive(Debug, Clone)]
pub struct FixedQuoteProvider {
    /// Price of every placeholder quote and history point.
    pub price: f64,
    /// Absolute change of every placeholder quote.
    pub change: f64,
    /// Percentage change of every placeholder quote.
    pub change_percent: f64,
    /// Returned by every `roll`; `1.0` never triggers failure injection.
    pub roll: f64,
}

impl Default for FixedQuoteProvider {
    fn default() -> Self {
        Self {
            price: 100.0,
            change: 1.0,
            change_percent: 1.0,
            roll: 1.0,
        }
    }
}

impl QuoteProvider for FixedQuoteProvider {
    fn placeholder_quote(&mut self, symbol: &Symbol) -> Quote {
        Quote::new(
            symbol.clone(),
            format!("{symbol} Company"),
            self.price,
            self.change,
            self.change_percent,
        )
    }

    /// Flat history at `price`.
    fn history(&mut self, days: u32, end: DateTime<Utc>) -> Vec<PricePoint> {
        (0..days)
            .rev()
            .map(|offset| PricePoint {
                timestamp: end.timestamp_millis() - i64::from(offset) * 86_400_000,
                price: self.price,
                open: self.price,
                high: self.price,
                low: self.price,
                volume: 1_000_000,
            })
            .collect()
    }

    fn next_price(&mut self, current_price: f64) -> f64 {
        current_price
    }

    /// One billion shares, P/E 20, 1% yield, beta 1.
    fn fundamentals(&mut self, quote: &Quote) -> Fundamentals {
        Fundamentals {
            market_cap: quote.price * 1e9,
            pe_ratio: 20.0,
            eps: quote.price / 20.0,
            dividend_yield: 1.0,
            beta: 1.0,
        }
    }

    fn roll(&mut self) -> f64 {
        self.roll
    }
}
