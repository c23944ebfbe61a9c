//! Company fundamentals, trading statistics, news, and profile text shown
//! beside a quote on the detail view, plus the market headlines on the
//! overview.
//!
//! Fundamentals come from the `QuoteProvider`; trading statistics are derived
//! from the trailing year of daily history; headlines are fixed templates
//! dated relative to today.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::format;
use crate::quote::{PricePoint, Quote};
use crate::symbol::Symbol;

/// Daily points covered by the 52-week figures.
const TRAILING_YEAR: usize = 365;

/// Valuation and risk figures for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    /// Market capitalisation in dollars.
    pub market_cap: f64,
    /// Trailing price/earnings ratio.
    pub pe_ratio: f64,
    /// Trailing twelve-month earnings per share.
    pub eps: f64,
    /// Annual dividend yield in percent.
    pub dividend_yield: f64,
    /// Five-year monthly beta.
    pub beta: f64,
}

/// Volume and 52-week range taken from daily history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingStats {
    /// Volume of the most recent session.
    pub volume: u64,
    /// Mean daily volume over the trailing year.
    pub avg_volume: u64,
    /// Highest intraday price over the trailing year.
    pub high_52_week: f64,
    /// Lowest intraday price over the trailing year.
    pub low_52_week: f64,
}

impl TradingStats {
    /// Figures over the last 365 points of `points` (oldest first); `None` when
    /// there is no history.
    pub fn of(points: &[PricePoint]) -> Option<Self> {
        let year = &points[points.len().saturating_sub(TRAILING_YEAR)..];
        let last = year.last()?;
        let total: u64 = year.iter().map(|p| p.volume).sum();
        Some(TradingStats {
            volume: last.volume,
            avg_volume: total / year.len() as u64,
            high_52_week: year.iter().map(|p| p.high).fold(f64::MIN, f64::max),
            low_52_week: year.iter().map(|p| p.low).fold(f64::MAX, f64::min),
        })
    }
}

/// One headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    /// Headline text.
    pub title: String,
    /// Publisher name.
    pub source: String,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    /// One-sentence summary.
    pub summary: String,
}

impl NewsItem {
    fn dated(title: String, source: &str, date: NaiveDate, summary: String) -> Self {
        NewsItem {
            title,
            source: source.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            summary,
        }
    }
}

/// Everything the detail view shows besides the quote and chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Company the profile describes.
    pub symbol: Symbol,
    /// Short description of the business.
    pub description: String,
    /// Valuation and risk figures.
    pub fundamentals: Fundamentals,
    /// Volume and 52-week range; `None` without history.
    pub trading: Option<TradingStats>,
    /// Recent headlines, newest first.
    pub news: Vec<NewsItem>,
}

impl CompanyProfile {
    /// Builds the profile for `quote`; headlines are dated back from `today`.
    pub fn new(quote: &Quote, fundamentals: Fundamentals, history: &[PricePoint], today: NaiveDate) -> Self {
        CompanyProfile {
            symbol: quote.symbol.clone(),
            description: format!(
                "{} trades under the ticker {}. Figures below are simulated and refresh with each session.",
                quote.name, quote.symbol
            ),
            fundamentals,
            trading: TradingStats::of(history),
            news: company_news(quote, today),
        }
    }

    /// Rows of the financial highlights table, as (metric, value).
    pub fn highlights(&self) -> Vec<(&'static str, String)> {
        let f = &self.fundamentals;
        let mut rows = vec![
            ("Market Cap", format::compact(f.market_cap)),
            ("P/E Ratio", format!("{:.2}", f.pe_ratio)),
            ("EPS (TTM)", format::price(f.eps)),
            ("Dividend Yield", format!("{:.2}%", f.dividend_yield)),
            ("Beta (5Y Monthly)", format!("{:.2}", f.beta)),
        ];
        if let Some(trading) = &self.trading {
            rows.push(("52 Week High", format::price(trading.high_52_week)));
            rows.push(("52 Week Low", format::price(trading.low_52_week)));
        }
        rows
    }
}

/// Three headlines about the company behind `quote`.
pub fn company_news(quote: &Quote, today: NaiveDate) -> Vec<NewsItem> {
    let name = &quote.name;
    let symbol = &quote.symbol;
    vec![
        NewsItem::dated(
            format!("{name} Unveils New Product Line"),
            "Tech News Daily",
            days_before(today, 3),
            format!("{name} announced its latest lineup, with upgrades across its core products."),
        ),
        NewsItem::dated(
            format!("Analysts Bullish on {symbol} Ahead of Earnings"),
            "MarketWatch",
            days_before(today, 10),
            format!("Several analysts have raised their rating on {name}, citing strong sales projections."),
        ),
        NewsItem::dated(
            format!("{name} Expands into New Markets"),
            "Bloomberg",
            days_before(today, 24),
            format!("Sources report that {name} is planning a major push into a new business line."),
        ),
    ]
}

/// Headlines for the market overview.
pub fn market_news(today: NaiveDate) -> Vec<NewsItem> {
    vec![
        NewsItem::dated(
            "Major Index Hits Record High".to_string(),
            "Market Wire",
            today,
            "Stocks rallied as investors reacted to new economic data; the Dow closed up 200 points.".to_string(),
        ),
        NewsItem::dated(
            "Tech Shares Lead Broad Rally".to_string(),
            "Market Wire",
            days_before(today, 1),
            "Chipmakers and software names gained as earnings season opened ahead of forecasts.".to_string(),
        ),
        NewsItem::dated(
            "Treasury Yields Slip Before Rate Decision".to_string(),
            "Market Wire",
            days_before(today, 2),
            "Bond yields edged lower as traders priced in a pause at the next central bank meeting.".to_string(),
        ),
    ]
}

fn days_before(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(today)
}
