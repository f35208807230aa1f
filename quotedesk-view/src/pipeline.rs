//! The view pipeline: one user interaction, one linear render pass.
//!
//! Control flow per render: normalize → cache-or-fetch → (fallback on
//! failure) → resample → trailing window → annotate. The session owns the
//! TTL cache and the last-known-good store as injected collaborators, so
//! tests drive the whole pipeline with scripted providers and no network.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use quotedesk_core::data::resample::{resample, ResamplePeriod};
use quotedesk_core::data::{normalize, CacheKey, LastGoodStore, QuoteError, QuoteProvider, TtlCache};
use quotedesk_core::domain::OhlcvSeries;
use quotedesk_core::indicators::{annotate, MovingAverages};

/// Bounds on the trailing bar-count window (the original UI slider).
pub const MIN_BARS: usize = 60;
pub const MAX_BARS: usize = 250;
pub const DEFAULT_BARS: usize = 180;

/// One view request, as handed in from the UI/CLI collaborator.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    /// Raw free-text symbol; normalization happens inside the pipeline.
    pub symbol: String,
    pub period: ResamplePeriod,
    /// Trailing window of bars to keep; clamped to [MIN_BARS, MAX_BARS].
    pub bars: usize,
    pub show_averages: bool,
}

impl ViewRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: ResamplePeriod::Daily,
            bars: DEFAULT_BARS,
            show_averages: true,
        }
    }
}

/// Whether the rendered table is live or served from the fallback store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStatus {
    Fresh,
    Fallback { reason: String },
}

impl DataStatus {
    /// Human-readable status line for the rendering collaborator.
    pub fn describe(&self) -> String {
        match self {
            DataStatus::Fresh => "fresh (fetched from provider)".to_string(),
            DataStatus::Fallback { reason } => format!("fallback: {reason}"),
        }
    }
}

/// The final table handed to rendering/export collaborators.
#[derive(Debug, Clone)]
pub struct ViewResult {
    /// Normalized symbol the table belongs to.
    pub symbol: String,
    pub period: ResamplePeriod,
    pub table: OhlcvSeries,
    /// Present when the request asked for moving averages; aligned with
    /// `table` by index.
    pub averages: Option<MovingAverages>,
    pub status: DataStatus,
    /// Non-fatal advisory about the symbol, if any.
    pub advisory: Option<String>,
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("enter a ticker symbol")]
    EmptySymbol,

    #[error(transparent)]
    Quote(#[from] QuoteError),
}

/// A user session: provider plus the two session-lifetime stores.
pub struct ViewSession<P> {
    provider: P,
    credential: String,
    cache: TtlCache,
    last_good: LastGoodStore,
}

impl<P: QuoteProvider> ViewSession<P> {
    pub fn new(provider: P, credential: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            provider,
            credential: credential.into(),
            cache: TtlCache::new(cache_ttl),
            last_good: LastGoodStore::new(),
        }
    }

    /// Execute one render pass.
    ///
    /// Fetch failures degrade to the last-known-good snapshot when one
    /// exists; otherwise they are terminal for this request — there is no
    /// partial output.
    pub fn render(&mut self, request: &ViewRequest) -> Result<ViewResult, ViewError> {
        let normalized = normalize(&request.symbol);
        if normalized.is_empty() {
            return Err(ViewError::EmptySymbol);
        }
        let advisory = normalized.foreign_suffix.map(|suffix| {
            format!("symbols ending in {suffix} are likely not covered by the data source")
        });
        let symbol = normalized.symbol;

        let key = CacheKey::new(symbol.clone(), &self.credential);
        let provider = &self.provider;
        let fetched = self
            .cache
            .get_or_fetch(key, || provider.fetch_daily(&symbol));

        let (daily, status) = match fetched {
            Ok(series) => {
                // A cache hit still counts as success here: the value it
                // held is known-good and refreshes the snapshot.
                self.last_good.record(&symbol, &series);
                (series, DataStatus::Fresh)
            }
            Err(err) => match self.last_good.lookup(&symbol) {
                Some(snapshot) => {
                    warn!(%symbol, error = %err, "fetch failed, serving last-known-good");
                    let status = DataStatus::Fallback {
                        reason: err.to_string(),
                    };
                    (snapshot.clone(), status)
                }
                None => return Err(err.into()),
            },
        };

        let resampled = resample(&daily, request.period);
        let table = resampled.tail(request.bars.clamp(MIN_BARS, MAX_BARS));
        let averages = request.show_averages.then(|| annotate(&table));

        Ok(ViewResult {
            symbol,
            period: request.period,
            table,
            averages,
            status,
            advisory,
        })
    }

    /// Wipe the TTL cache unconditionally and acknowledge to the user. The
    /// last-known-good store is deliberately untouched, so a failed refetch
    /// right after a clear still has a fallback.
    pub fn clear_cache(&mut self, notifier: &dyn crate::notify::Notifier) {
        self.cache.clear();
        notifier.cache_cleared();
    }
}
