//! Running snapshot of baseline vs current prices
//!
//! Entries keep the order in which the baseline quotes arrived (that order
//! is what gets persisted and what breaks ties when ranking), but refreshes
//! are merged by symbol, so a provider that reorders its response cannot
//! attribute a price to the wrong asset.

use crate::{
    change::percent_change,
    error::SnapshotError,
    types::{Quote, SnapshotEntry},
};
use std::collections::{HashMap, HashSet};

/// Ordered set of snapshot entries with a symbol index
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Builds a baseline snapshot from the first poll
    ///
    /// Every entry starts with `start_price == current_price` and no change.
    pub fn initialize(quotes: &[Quote]) -> Result<Self, SnapshotError> {
        let entries = quotes.iter().map(SnapshotEntry::baseline).collect();
        Self::from_entries(entries)
    }

    /// Rebuilds a snapshot from persisted entries
    pub fn from_entries(entries: Vec<SnapshotEntry>) -> Result<Self, SnapshotError> {
        if entries.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.symbol.clone(), position).is_some() {
                return Err(SnapshotError::DuplicateSymbol(entry.symbol.clone()));
            }
        }

        Ok(Self { entries, index })
    }

    /// Applies a fresh poll to the snapshot
    ///
    /// The quote set must name exactly the baselined symbols. On any
    /// mismatch the snapshot is left untouched and the error names the
    /// offending symbol.
    pub fn refresh(&mut self, quotes: &[Quote]) -> Result<(), SnapshotError> {
        let mut prices: HashMap<&str, f64> = HashMap::with_capacity(quotes.len());
        for quote in quotes {
            if !self.index.contains_key(&quote.symbol) {
                return Err(SnapshotError::UnknownSymbol(quote.symbol.clone()));
            }
            prices.insert(quote.symbol.as_str(), quote.price);
        }

        if let Some(missing) = self
            .entries
            .iter()
            .find(|entry| !prices.contains_key(entry.symbol.as_str()))
        {
            return Err(SnapshotError::MissingQuote(missing.symbol.clone()));
        }

        for entry in &mut self.entries {
            let price = prices[entry.symbol.as_str()];
            entry.current_price = price;
            entry.percent_change = match percent_change(entry.start_price, price) {
                Ok(change) => Some(change),
                Err(e) => {
                    tracing::debug!(symbol = %entry.symbol, error = %e, "Percent change undefined");
                    None
                }
            };
        }

        Ok(())
    }

    /// Entries for the given symbols, in snapshot order
    pub fn tracked<'a>(&'a self, symbols: &[String]) -> Vec<&'a SnapshotEntry> {
        let wanted: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        self.entries
            .iter()
            .filter(|entry| wanted.contains(entry.symbol.as_str()))
            .collect()
    }

    /// Looks up one entry by symbol
    pub fn get(&self, symbol: &str) -> Option<&SnapshotEntry> {
        self.index.get(symbol).map(|&position| &self.entries[position])
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Symbols in snapshot order
    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
