//! User-curated list of tracked symbols.

use log::{debug, info};

use crate::catalog::CatalogStore;
use crate::config::DEFAULT_WATCHLIST;
use crate::provider::QuoteProvider;
use crate::quote::WatchlistEntry;
use crate::symbol::Symbol;

/// Insertion-ordered set of watchlist entries, unique by symbol.
///
/// Symbols are trimmed and uppercased before every operation; blank input is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistStore {
    entries: Vec<WatchlistEntry>,
}

impl WatchlistStore {
    /// Empty watchlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Watchlist holding the default symbols, priced from `catalog`.
    pub fn seeded(catalog: &CatalogStore, provider: &mut dyn QuoteProvider) -> Self {
        Self::with_symbols(DEFAULT_WATCHLIST, catalog, provider)
    }

    /// Watchlist holding `symbols` in order.
    pub fn with_symbols<I, S>(symbols: I, catalog: &CatalogStore, provider: &mut dyn QuoteProvider) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for symbol in symbols {
            store.add(symbol.as_ref(), catalog, provider);
        }
        store
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the watchlist has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `raw`, after normalisation.
    pub fn get(&self, raw: &str) -> Option<&WatchlistEntry> {
        let symbol = Symbol::new(raw).ok()?;
        self.position(&symbol).map(|index| &self.entries[index])
    }

    /// Whether `raw` is on the watchlist.
    pub fn contains(&self, raw: &str) -> bool {
        self.get(raw).is_some()
    }

    /// Adds `raw` and returns the new entry; `None` when blank or already
    /// present.
    ///
    /// Catalogued symbols copy the catalog quote, others get a placeholder
    /// quote from `provider`.
    pub fn add(
        &mut self,
        raw: &str,
        catalog: &CatalogStore,
        provider: &mut dyn QuoteProvider,
    ) -> Option<&WatchlistEntry> {
        let symbol = match Symbol::new(raw) {
            Ok(symbol) => symbol,
            Err(e) => {
                debug!("Watchlist add ignored: {}", e);
                return None;
            }
        };
        if self.position(&symbol).is_some() {
            debug!("{} is already on the watchlist", symbol);
            return None;
        }
        let quote = match catalog.get(&symbol) {
            Some(quote) => quote.clone(),
            None => provider.placeholder_quote(&symbol),
        };
        info!("Added {} to watchlist", symbol);
        self.entries.push(WatchlistEntry::from(quote));
        self.entries.last()
    }

    /// Removes `raw` if present. Returns whether an entry was removed.
    pub fn remove(&mut self, raw: &str) -> bool {
        let Ok(symbol) = Symbol::new(raw) else {
            return false;
        };
        match self.position(&symbol) {
            Some(index) => {
                self.entries.remove(index);
                info!("Removed {} from watchlist", symbol);
                true
            }
            None => false,
        }
    }

    /// Adds `raw` when absent, removes it when present. Returns whether the
    /// symbol is on the watchlist afterwards.
    pub fn toggle(&mut self, raw: &str, catalog: &CatalogStore, provider: &mut dyn QuoteProvider) -> bool {
        if self.remove(raw) {
            return false;
        }
        self.add(raw, catalog, provider).is_some()
    }

    /// Symbols in insertion order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.entries.iter().map(|entry| entry.quote.symbol.clone()).collect()
    }

    fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.quote.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FixedQuoteProvider;
    use proptest::prelude::*;

    fn setup() -> (CatalogStore, FixedQuoteProvider) {
        (CatalogStore::default(), FixedQuoteProvider::default())
    }

    #[test]
    fn seeded_with_defaults_from_catalog() {
        let (catalog, mut provider) = setup();
        let watchlist = WatchlistStore::seeded(&catalog, &mut provider);
        let names: Vec<String> = watchlist.symbols().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["AAPL", "MSFT", "GOOGL"]);
        assert_eq!(watchlist.get("aapl").unwrap().quote.price, 170.34);
        assert_eq!(watchlist.get("MSFT").unwrap().link_to, "/stock/MSFT");
    }

    #[test]
    fn add_is_idempotent_and_normalised() {
        let (catalog, mut provider) = setup();
        let mut watchlist = WatchlistStore::new();
        assert!(watchlist.add(" tsla ", &catalog, &mut provider).is_some());
        assert!(watchlist.add("TSLA", &catalog, &mut provider).is_none());
        assert_eq!(watchlist.len(), 1);
        assert!(watchlist.contains("tsla"));
        assert_eq!(watchlist.get("TSLA").unwrap().quote.name, "Tesla, Inc.");
    }

    #[test]
    fn unknown_symbols_get_placeholder_quotes() {
        let (catalog, mut provider) = setup();
        let mut watchlist = WatchlistStore::new();
        let entry = watchlist.add("rivn", &catalog, &mut provider).unwrap();
        assert_eq!(entry.quote.name, "RIVN Company");
        assert_eq!(entry.quote.price, 100.0);
        assert_eq!(entry.link_to, "/stock/RIVN");
    }

    #[test]
    fn blank_symbols_are_ignored() {
        let (catalog, mut provider) = setup();
        let mut watchlist = WatchlistStore::new();
        assert!(watchlist.add("   ", &catalog, &mut provider).is_none());
        assert!(!watchlist.remove(""));
        assert!(!watchlist.contains(""));
        assert!(watchlist.is_empty());
    }

    #[test]
    fn remove_absent_is_a_no_op() {
        let (catalog, mut provider) = setup();
        let mut watchlist = WatchlistStore::seeded(&catalog, &mut provider);
        assert!(!watchlist.remove("NVDA"));
        assert_eq!(watchlist.len(), 3);
        assert!(watchlist.remove("msft"));
        assert!(!watchlist.contains("MSFT"));
        let names: Vec<String> = watchlist.symbols().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["AAPL", "GOOGL"]);
    }

    #[test]
    fn toggle_flips_membership() {
        let (catalog, mut provider) = setup();
        let mut watchlist = WatchlistStore::new();
        assert!(watchlist.toggle("nvda", &catalog, &mut provider));
        assert!(watchlist.contains("NVDA"));
        assert!(!watchlist.toggle("NVDA", &catalog, &mut provider));
        assert!(!watchlist.contains("NVDA"));
    }

    proptest! {
        #[test]
        fn membership_follows_add_and_remove(raw in "[a-zA-Z]{1,5}", pad in " {0,2}") {
            let (catalog, mut provider) = setup();
            let mut watchlist = WatchlistStore::new();
            let padded = format!("{pad}{raw}{pad}");
            watchlist.add(&padded, &catalog, &mut provider);
            watchlist.add(&raw, &catalog, &mut provider);
            prop_assert!(watchlist.contains(&raw));
            prop_assert_eq!(watchlist.len(), 1);
            prop_assert!(watchlist.remove(&padded));
            prop_assert!(!watchlist.contains(&raw));
        }
    }
}
