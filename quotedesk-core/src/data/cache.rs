//! In-memory TTL cache for fetched series.
//!
//! Memoizes fetch results per (symbol, credential-scope) for a fixed
//! duration. The cache is a pure keyed store: it knows nothing about retry
//! or back-off policy, and it never caches a failure. `clear()` is a full,
//! unconditional wipe.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::provider::QuoteError;
use crate::domain::OhlcvSeries;

/// Cache key: the normalized symbol plus a scope derived from the credential,
/// so entries fetched under different credentials never alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub scope: String,
}

impl CacheKey {
    /// Key a symbol under a credential. The credential itself is not stored;
    /// a short content hash stands in for it.
    pub fn new(symbol: impl Into<String>, credential: &str) -> Self {
        let hash = blake3::hash(credential.as_bytes()).to_hex();
        Self {
            symbol: symbol.into(),
            scope: hash[..16].to_string(),
        }
    }
}

struct CacheEntry {
    series: OhlcvSeries,
    stored_at: Instant,
}

/// TTL-evicting memo for quote fetches.
pub struct TtlCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl TtlCache {
    /// Default freshness window.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Return the cached series for `key` if it is still fresh; otherwise run
    /// `fetch`, store the result on success, and return it. Fetch failures
    /// propagate unchanged and leave the cache untouched.
    pub fn get_or_fetch<F>(&mut self, key: CacheKey, fetch: F) -> Result<OhlcvSeries, QuoteError>
    where
        F: FnOnce() -> Result<OhlcvSeries, QuoteError>,
    {
        if let Some(entry) = self.entries.get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                debug!(symbol = %key.symbol, "cache hit");
                return Ok(entry.series.clone());
            }
            debug!(symbol = %key.symbol, "cache entry expired");
        }

        let series = fetch()?;
        self.entries.insert(
            key,
            CacheEntry {
                series: series.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(series)
    }

    /// Remove every entry, regardless of age.
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        info!(removed, "cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, OhlcvSeries};
    use chrono::NaiveDate;

    fn sample_series(close: f64) -> OhlcvSeries {
        OhlcvSeries::from_bars(vec![Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000,
        }])
    }

    #[test]
    fn second_call_within_ttl_skips_fetcher() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let key = CacheKey::new("MSFT", "key-a");
        let mut fetches = 0;

        for _ in 0..2 {
            let series = cache
                .get_or_fetch(key.clone(), || {
                    fetches += 1;
                    Ok(sample_series(101.0))
                })
                .unwrap();
            assert_eq!(series.len(), 1);
        }

        assert_eq!(fetches, 1);
    }

    #[test]
    fn expired_entry_refetches() {
        let mut cache = TtlCache::new(Duration::from_millis(10));
        let key = CacheKey::new("MSFT", "key-a");
        let mut fetches = 0;
        let mut fetch = || {
            fetches += 1;
            Ok(sample_series(101.0))
        };

        cache.get_or_fetch(key.clone(), &mut fetch).unwrap();
        std::thread::sleep(Duration::from_millis(15));
        cache.get_or_fetch(key, &mut fetch).unwrap();

        assert_eq!(fetches, 2);
    }

    #[test]
    fn clear_forces_refetch_regardless_of_age() {
        let mut cache = TtlCache::new(Duration::from_secs(3600));
        let key = CacheKey::new("MSFT", "key-a");
        let mut fetches = 0;
        let mut fetch = || {
            fetches += 1;
            Ok(sample_series(101.0))
        };

        cache.get_or_fetch(key.clone(), &mut fetch).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.get_or_fetch(key, &mut fetch).unwrap();

        assert_eq!(fetches, 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let key = CacheKey::new("MSFT", "key-a");

        let err = cache
            .get_or_fetch(key.clone(), || Err(QuoteError::DataUnavailable))
            .unwrap_err();
        assert!(matches!(err, QuoteError::DataUnavailable));
        assert!(cache.is_empty());

        // Next call runs the fetcher again and caches the success.
        cache
            .get_or_fetch(key, || Ok(sample_series(101.0)))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn credential_scopes_do_not_alias() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let mut fetches = 0;
        let mut fetch = || {
            fetches += 1;
            Ok(sample_series(101.0))
        };

        cache
            .get_or_fetch(CacheKey::new("MSFT", "key-a"), &mut fetch)
            .unwrap();
        cache
            .get_or_fetch(CacheKey::new("MSFT", "key-b"), &mut fetch)
            .unwrap();

        assert_eq!(fetches, 2);
        assert_eq!(cache.len(), 2);
    }
}
