//! Quote provider trait and structured error types.
//!
//! The QuoteProvider trait abstracts over the remote quote source so the
//! view pipeline can swap implementations and mock for tests. Retry and
//! back-off policy belongs to the provider; the cache layer above this
//! trait never sees it.

use thiserror::Error;

use crate::domain::OhlcvSeries;

/// Structured error types for quote fetches.
///
/// These are designed to be displayed verbatim in CLI status lines, so the
/// messages name the symbol involved.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("no symbol given")]
    EmptySymbol,

    #[error("symbol not supported by provider: {symbol}: {message}")]
    InvalidSymbol { symbol: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned no daily series (try again shortly)")]
    DataUnavailable,
}

/// Trait for daily quote providers.
pub trait QuoteProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the daily OHLCV series for a symbol, sorted ascending by date.
    fn fetch_daily(&self, symbol: &str) -> Result<OhlcvSeries, QuoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_for_status_lines() {
        let err = QuoteError::InvalidSymbol {
            symbol: "NOPE".into(),
            message: "Invalid API call".into(),
        };
        let text = err.to_string();
        assert!(text.contains("NOPE"));
        assert!(text.contains("Invalid API call"));

        assert!(QuoteError::DataUnavailable.to_string().contains("daily series"));
    }
}
