//! Application routes and their path form.
//!
//! Paths look like `/`, `/stock/AAPL`, `/watchlist`, `/search?q=apple`, and
//! `/auth`. Only the `q` query parameter and the `symbol` segment are read.

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use url::Url;

use crate::result::Result;
use crate::symbol::Symbol;

/// Base used to resolve relative route paths.
const ROUTE_BASE: &str = "app://stocks/";

/// A view the browser can show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "param", rename_all = "lowercase")]
pub enum Route {
    /// Market overview, `/`.
    Home,
    /// Detail view, `/stock/{symbol}`.
    Stock(Symbol),
    /// `/watchlist`.
    Watchlist,
    /// Raw search text; may be blank.
    Search(String),
    /// Sign-in placeholder, `/auth`.
    Auth,
    /// Anything unrecognised, with the path as given.
    NotFound(String),
}

impl Route {
    /// Parses a path. Unknown paths become `NotFound`; only paths that cannot
    /// be read as a URL at all are errors.
    pub fn parse(path: &str) -> Result<Route> {
        let trimmed = path.trim();
        let base = Url::parse(ROUTE_BASE)?;
        let url = base.join(trimmed)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["watchlist"] => Route::Watchlist,
            ["auth"] => Route::Auth,
            ["search"] => {
                let query = url
                    .query_pairs()
                    .find(|(key, _)| key == "q")
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default();
                Route::Search(query)
            }
            ["stock", raw] => match percent_decode(raw).and_then(|s| Symbol::new(&s).ok()) {
                Some(symbol) => Route::Stock(symbol),
                None => Route::NotFound(trimmed.to_string()),
            },
            _ => Route::NotFound(trimmed.to_string()),
        };
        Ok(route)
    }

    /// Canonical path; the search text is form-encoded.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Stock(symbol) => symbol.link(),
            Route::Watchlist => "/watchlist".to_string(),
            Route::Search(query) => {
                let encoded: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("q", query.trim())
                    .finish();
                format!("/search?{encoded}")
            }
            Route::Auth => "/auth".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decodes one path segment. Unlike a query value, `+` and `&` are literal.
fn percent_decode(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
