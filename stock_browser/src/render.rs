//! Plain-text and JSON rendering of views.

use std::fmt::Write;

use stock_common::format;
use stock_common::pagination::PageMarker;
use stock_common::profile::NewsItem;
use stock_common::search::SearchView;
use stock_common::{CompanyProfile, Quote, Result, TickerItem};

use crate::app::{HomeView, View};

/// Renders `view` as pretty-printed JSON.
pub fn json(view: &View) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// Renders `view` as text.
pub fn text(view: &View) -> String {
    let mut out = String::new();
    match view {
        View::Home(home) => home_text(&mut out, home),
        View::Search(search) => search_text(&mut out, search),
        View::Stock(detail) => {
            let _ = writeln!(out, "== {} ({}) ==", detail.symbol, detail.range);
            match &detail.quote {
                Some(quote) => {
                    let _ = writeln!(out, "{}", quote.name);
                    let _ = writeln!(
                        out,
                        "{} {} {}",
                        format::price(quote.price),
                        format::arrow(quote.change),
                        format::change(quote.change, quote.change_percent)
                    );
                }
                None if detail.loading => out.push_str("Loading quote...\n"),
                None => out.push_str("Quote unavailable\n"),
            }
            match &detail.summary {
                Some(summary) => {
                    let _ = writeln!(
                        out,
                        "{} days: {} -> {} ({:+.2}%), low {}, high {}, volume {}",
                        detail.points,
                        format::price(summary.first),
                        format::price(summary.last),
                        summary.change_percent,
                        format::price(summary.min),
                        format::price(summary.max),
                        format::compact(summary.total_volume as f64)
                    );
                }
                None if detail.loading => out.push_str("Loading history...\n"),
                None => out.push_str("No price history\n"),
            }
            if let Some(profile) = &detail.profile {
                profile_text(&mut out, profile);
            }
            let _ = writeln!(
                out,
                "{}",
                if detail.in_watchlist { "[in watchlist] `toggle` to remove" } else { "`toggle` to add to watchlist" }
            );
        }
        View::Watchlist { entries } => {
            out.push_str("== Watchlist ==\n");
            if entries.is_empty() {
                out.push_str("(empty)\n");
            }
            for entry in entries {
                quote_line(&mut out, &entry.quote);
            }
        }
        View::Auth => out.push_str("Sign-in is not supported in this browser.\n"),
        View::NotFound { path } => {
            let _ = writeln!(out, "404: nothing at {path}");
        }
    }
    out
}

fn home_text(out: &mut String, home: &HomeView) {
    out.push_str("== Market overview ==\n");
    out.push_str(&tape_line(&home.tape));
    out.push('\n');
    out.push_str("Top gainers:\n");
    for quote in &home.top_gainers {
        quote_line(out, quote);
    }
    out.push_str("Top losers:\n");
    for quote in &home.top_losers {
        quote_line(out, quote);
    }
    out.push_str("Market highlights:\n");
    news_lines(out, &home.news);
}

/// Key statistics, financial highlights, news, and the company description.
fn profile_text(out: &mut String, profile: &CompanyProfile) {
    out.push_str("Key statistics:\n");
    if let Some(trading) = &profile.trading {
        let _ = writeln!(
            out,
            "  Volume {}  Avg volume {}  52-week range {} - {}",
            format::compact(trading.volume as f64),
            format::compact(trading.avg_volume as f64),
            format::price(trading.low_52_week),
            format::price(trading.high_52_week)
        );
    }
    let f = &profile.fundamentals;
    let _ = writeln!(
        out,
        "  Market cap {}  P/E {:.2}  EPS {}  Yield {:.2}%  Beta {:.2}",
        format::compact(f.market_cap),
        f.pe_ratio,
        format::price(f.eps),
        f.dividend_yield,
        f.beta
    );
    out.push_str("Financial highlights:\n");
    for (metric, value) in profile.highlights() {
        let _ = writeln!(out, "  {metric:<18} {value:>10}");
    }
    out.push_str("News:\n");
    news_lines(out, &profile.news);
    let _ = writeln!(out, "Profile:\n  {}", profile.description);
}

fn news_lines(out: &mut String, news: &[NewsItem]) {
    for item in news {
        let _ = writeln!(out, "  {} {} ({})", item.date, item.title, item.source);
        let _ = writeln!(out, "    {}", item.summary);
    }
}

fn search_text(out: &mut String, search: &SearchView) {
    let _ = writeln!(out, "== Search: {:?} ==", search.query);
    if search.loading {
        out.push_str("Searching...\n");
        return;
    }
    if search.query.is_empty() {
        out.push_str("Type `search <text>` to look up a symbol or company.\n");
        return;
    }
    if search.total_results == 0 {
        let _ = writeln!(out, "No results for {:?}", search.query);
        return;
    }
    let _ = writeln!(out, "{} result(s)", search.total_results);
    for quote in &search.items {
        quote_line(out, quote);
    }
    let strip = markers(&search.markers);
    if !strip.is_empty() {
        let prev = if search.navigation.has_previous { "< prev" } else { "      " };
        let next = if search.navigation.has_next { "next >" } else { "" };
        let _ = writeln!(out, "{prev}  {strip}  {next}");
    }
}

/// One row: symbol, name, price, and change.
fn quote_line(out: &mut String, quote: &Quote) {
    let _ = writeln!(
        out,
        "  {:<6} {:<30} {:>10} {} {}",
        quote.symbol.as_str(),
        quote.name,
        format::price(quote.price),
        format::arrow(quote.change),
        format::change(quote.change, quote.change_percent)
    );
}

/// Page strip, current page in brackets: `1 ... 4 [5] 6 ... 9`.
pub fn markers(markers: &[PageMarker]) -> String {
    markers
        .iter()
        .map(|marker| match marker {
            PageMarker::Page { number, current: true } => format!("[{number}]"),
            PageMarker::Page { number, .. } => number.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single tape entry, e.g. `AAPL 170.34 ▲ +1.12 (0.66%)`.
pub fn ticker(item: &TickerItem) -> String {
    format!(
        "{} {} {} {}",
        item.symbol,
        format::price(item.price),
        format::arrow(item.change),
        format::change(item.change, item.change_percent)
    )
}

/// All tape entries on one line.
pub fn tape_line(items: &[TickerItem]) -> String {
    items.iter().map(ticker).collect::<Vec<_>>().join(" | ")
}
