//! Ticker symbols and parsing helpers shared by the feed and the browser.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Bytes escaped when a symbol is written as a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A normalised ticker symbol: trimmed, uppercased, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalises `raw` into a symbol. Fails with `InvalidSymbol` when nothing
    /// is left after trimming.
    pub fn new(raw: &str) -> Result<Self, MarketError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MarketError::InvalidSymbol(raw.to_string()));
        }
        Ok(Symbol(trimmed.to_uppercase()))
    }

    /// Symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Detail route for this symbol, e.g. `/stock/AAPL`. The symbol is
    /// percent-encoded as a single path segment.
    pub fn link(&self) -> String {
        format!("/stock/{}", utf8_percent_encode(&self.0, SEGMENT))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = MarketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trait providing list parsing for symbols.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, whitespace, or new lines. Empty
    /// fragments are skipped and duplicates keep their first position.
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Symbol>, MarketError>;
}

impl SymbolParser for Symbol {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, MarketError> {
        let mut symbols: Vec<Symbol> = Vec::new();

        for line_result in reader.lines() {
            let line = line_result?;
            for fragment in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if fragment.is_empty() {
                    continue;
                }
                let symbol = Symbol::new(fragment)?;
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        Ok(symbols)
    }
}
