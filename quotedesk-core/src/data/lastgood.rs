//! Last-known-good store.
//!
//! Session-lifetime map from symbol to the most recent successfully fetched
//! series. Written on every fetch success (cache hits included), read only
//! when a fresh fetch fails. Entries never expire, and a cache clear does
//! not touch this store — that is what keeps a fallback available right
//! after a clear followed by a failed refetch.

use std::collections::HashMap;

use crate::domain::OhlcvSeries;

#[derive(Default)]
pub struct LastGoodStore {
    snapshots: HashMap<String, OhlcvSeries>,
}

impl LastGoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the snapshot for a symbol unconditionally.
    pub fn record(&mut self, symbol: &str, series: &OhlcvSeries) {
        self.snapshots.insert(symbol.to_string(), series.clone());
    }

    /// Whatever we have for the symbol, however old. Answers "anything at
    /// all", not "is it fresh".
    pub fn lookup(&self, symbol: &str) -> Option<&OhlcvSeries> {
        self.snapshots.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
