//! Daily price history: generation, range selection, and summaries.

use chrono::{DateTime, Days, Months, Utc};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::MarketError;
use crate::quote::PricePoint;

/// Lowest closing price the random walk may reach.
const PRICE_FLOOR: f64 = 5.0;

/// Chart window selectable on the detail view.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum TimeRange {
    /// One trading day.
    #[strum(serialize = "1D")]
    #[serde(rename = "1D")]
    #[value(name = "1D", alias = "1d")]
    OneDay,
    /// Five days.
    #[strum(serialize = "5D")]
    #[serde(rename = "5D")]
    #[value(name = "5D", alias = "5d")]
    FiveDays,
    /// One month.
    #[default]
    #[strum(serialize = "1M")]
    #[serde(rename = "1M")]
    #[value(name = "1M", alias = "1m")]
    OneMonth,
    /// Six months.
    #[strum(serialize = "6M")]
    #[serde(rename = "6M")]
    #[value(name = "6M", alias = "6m")]
    SixMonths,
    /// One year.
    #[strum(serialize = "1Y")]
    #[serde(rename = "1Y")]
    #[value(name = "1Y", alias = "1y")]
    OneYear,
    /// Every cached point.
    #[strum(serialize = "ALL")]
    #[serde(rename = "ALL")]
    #[value(name = "ALL", alias = "all")]
    All,
}

impl TimeRange {
    /// Parses a range label such as `6M` or `all`.
    pub fn parse_label(label: &str) -> Result<Self, MarketError> {
        label
            .trim()
            .parse()
            .map_err(|_| MarketError::InvalidTimeRange(label.to_string()))
    }

    /// Earliest instant inside the range ending at `now`; `None` for `All`.
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::OneDay => now.checked_sub_days(Days::new(1)),
            TimeRange::FiveDays => now.checked_sub_days(Days::new(5)),
            TimeRange::OneMonth => now.checked_sub_months(Months::new(1)),
            TimeRange::SixMonths => now.checked_sub_months(Months::new(6)),
            TimeRange::OneYear => now.checked_sub_months(Months::new(12)),
            TimeRange::All => None,
        }
    }

    /// Points inside the range, oldest first.
    pub fn filter(self, points: &[PricePoint], now: DateTime<Utc>) -> Vec<PricePoint> {
        let cutoff = self.start(now).map(|start| start.timestamp_millis());
        let mut selected: Vec<PricePoint> = points
            .iter()
            .filter(|point| cutoff.is_none_or(|cutoff| point.timestamp >= cutoff))
            .cloned()
            .collect();
        selected.sort_by_key(|point| point.timestamp);
        selected
    }
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Random-walk daily history of `days` points, the last one at `end`.
///
/// Each day moves by up to 3% with a slight upward bias and never closes
/// under the price floor. Opens sit within half a percent of the close and
/// highs/lows extend up to 1.5% beyond both.
pub fn generate_history<R: Rng>(rng: &mut R, days: u32, end: DateTime<Utc>) -> Vec<PricePoint> {
    let mut price: f64 = rng.random_range(50.0..250.0);
    let mut points = Vec::with_capacity(days as usize);

    for offset in (0..days).rev() {
        let Some(date) = end.checked_sub_days(Days::new(u64::from(offset))) else {
            continue;
        };
        let change = (rng.random::<f64>() - 0.48) * (price * 0.03);
        price = (price + change).max(PRICE_FLOOR);

        let open = price - (rng.random::<f64>() - 0.5) * (price * 0.01);
        let high = price.max(open) + rng.random::<f64>() * (price * 0.015);
        let low = price.min(open) - rng.random::<f64>() * (price * 0.015);
        let volume = rng.random_range(500_000..1_500_000);

        points.push(PricePoint {
            timestamp: date.timestamp_millis(),
            price: cents(price),
            open: cents(open),
            high: cents(high),
            low: cents(low),
            volume,
        });
    }
    points
}

/// Headline figures for a run of history points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    /// First close in the run.
    pub first: f64,
    /// Last close in the run.
    pub last: f64,
    /// Lowest close.
    pub min: f64,
    /// Highest close.
    pub max: f64,
    /// Sum of daily volumes.
    pub total_volume: u64,
    /// Change from first to last close, in percent.
    pub change_percent: f64,
}

impl HistorySummary {
    /// Summarises `points` (expected oldest first); `None` when empty.
    pub fn of(points: &[PricePoint]) -> Option<Self> {
        let first = points.first()?.price;
        let last = points.last()?.price;
        let min = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let change_percent = if first > 0.0 { (last - first) / first * 100.0 } else { 0.0 };
        Some(HistorySummary {
            first,
            last,
            min,
            max,
            total_volume: points.iter().map(|p| p.volume).sum(),
            change_percent,
        })
    }
}
