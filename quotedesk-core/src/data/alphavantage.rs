//! Alpha Vantage data provider.
//!
//! Fetches daily OHLCV bars from the Alpha Vantage query API. Handles the
//! provider's in-body sentinels (rate-limit notes and invalid-symbol errors
//! arrive inside an HTTP 200 response), the single fixed-delay retry on rate
//! limiting, and the fall-back to the adjusted daily series when the primary
//! series comes back empty.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{QuoteError, QuoteProvider};
use crate::domain::{Bar, OhlcvSeries};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(12);

/// Daily series endpoints, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesFunction {
    Daily,
    DailyAdjusted,
}

impl SeriesFunction {
    fn query_value(self) -> &'static str {
        match self {
            SeriesFunction::Daily => "TIME_SERIES_DAILY",
            SeriesFunction::DailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
        }
    }
}

/// One row of a daily time series, under the provider's numbered labels.
///
/// The primary series carries `1. open` through `5. volume`; the adjusted
/// variant replaces the close with `5. adjusted close` and moves volume to
/// `6. volume`. Both shapes decode into this one struct.
#[derive(Debug, Deserialize)]
struct DailyFields {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "5. adjusted close")]
    adjusted_close: Option<String>,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
    #[serde(rename = "6. volume")]
    adjusted_volume: Option<String>,
}

/// Alpha Vantage response envelope. Errors and rate limits are sentinel
/// fields inside an otherwise 200 body.
#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Time Series (Daily)")]
    daily: Option<BTreeMap<String, DailyFields>>,
    #[serde(rename = "Time Series (Daily Adjusted)")]
    daily_adjusted: Option<BTreeMap<String, DailyFields>>,
}

/// What one request actually told us, decoded at the fetch boundary so raw
/// sentinel-field checks never leak past this module.
#[derive(Debug)]
enum Probe {
    Series(BTreeMap<String, DailyFields>),
    RateLimited,
    InvalidSymbol(String),
    Empty,
}

fn classify(resp: SeriesResponse) -> Probe {
    if let Some(message) = resp.error_message {
        return Probe::InvalidSymbol(message);
    }
    if resp.note.is_some() {
        return Probe::RateLimited;
    }
    match resp.daily.or(resp.daily_adjusted) {
        Some(rows) if !rows.is_empty() => Probe::Series(rows),
        _ => Probe::Empty,
    }
}

/// Run the fetch policy over the two endpoints: on a rate-limit signal wait
/// out the fixed back-off and retry the same request exactly once, then
/// proceed best-effort; on an empty series move on to the adjusted variant;
/// on an explicit invalid-symbol error fail immediately.
fn resolve_series<F>(
    symbol: &str,
    backoff: Duration,
    mut call: F,
) -> Result<BTreeMap<String, DailyFields>, QuoteError>
where
    F: FnMut(SeriesFunction) -> Result<Probe, QuoteError>,
{
    for function in [SeriesFunction::Daily, SeriesFunction::DailyAdjusted] {
        let mut probe = call(function)?;

        if matches!(probe, Probe::RateLimited) {
            warn!(
                symbol,
                backoff_secs = backoff.as_secs(),
                "rate limited, retrying once after back-off"
            );
            std::thread::sleep(backoff);
            probe = call(function)?;
        }

        match probe {
            Probe::Series(rows) => return Ok(rows),
            Probe::InvalidSymbol(message) => {
                return Err(QuoteError::InvalidSymbol {
                    symbol: symbol.to_string(),
                    message,
                })
            }
            // Still rate limited after the single retry, or no series on
            // this endpoint: try the next one best-effort.
            Probe::RateLimited | Probe::Empty => continue,
        }
    }
    Err(QuoteError::DataUnavailable)
}

/// Parse provider rows into canonical bars: coerce each field, keeping NaN
/// for prices that fail, 0 for volumes that fail; drop rows with unparseable
/// dates or nothing in them at all.
fn parse_rows(rows: BTreeMap<String, DailyFields>) -> OhlcvSeries {
    let mut bars = Vec::with_capacity(rows.len());
    for (key, fields) in rows {
        let Ok(date) = NaiveDate::parse_from_str(&key, "%Y-%m-%d") else {
            warn!(row_key = %key, "dropping series row with unparseable date");
            continue;
        };

        let close = coerce(fields.adjusted_close.as_deref().or(fields.close.as_deref()));
        let volume = fields
            .volume
            .as_deref()
            .or(fields.adjusted_volume.as_deref())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let bar = Bar {
            date,
            open: coerce(fields.open.as_deref()),
            high: coerce(fields.high.as_deref()),
            low: coerce(fields.low.as_deref()),
            close,
            volume,
        };

        if bar.is_blank() && bar.volume == 0 {
            continue;
        }
        bars.push(bar);
    }
    OhlcvSeries::from_bars(bars)
}

fn coerce(field: Option<&str>) -> f64 {
    field
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Alpha Vantage daily-series client.
pub struct AlphaVantageClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    backoff: Duration,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, REQUEST_TIMEOUT)
    }

    /// Build a client with a non-default transport timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quotedesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            backoff: RATE_LIMIT_BACKOFF,
        }
    }

    /// Point the client at a different host (tests use a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the rate-limit back-off delay (tests use zero).
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Issue a single request and decode the body into a [`Probe`].
    fn request(&self, function: SeriesFunction, symbol: &str) -> Result<Probe, QuoteError> {
        let url = format!("{}/query", self.base_url);
        debug!(symbol, function = function.query_value(), "requesting daily series");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("function", function.query_value()),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
                ("outputsize", "compact"),
            ])
            .send()
            .map_err(|e| QuoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(QuoteError::Transport(format!("HTTP {status} for {symbol}")));
        }

        let body: SeriesResponse = resp
            .json()
            .map_err(|e| QuoteError::Transport(format!("failed to decode body for {symbol}: {e}")))?;

        Ok(classify(body))
    }
}

impl QuoteProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch_daily(&self, symbol: &str) -> Result<OhlcvSeries, QuoteError> {
        if symbol.is_empty() {
            return Err(QuoteError::EmptySymbol);
        }

        let rows = resolve_series(symbol, self.backoff, |function| {
            self.request(function, symbol)
        })?;

        let series = parse_rows(rows);
        if series.is_empty() {
            return Err(QuoteError::DataUnavailable);
        }
        Ok(series)
    }
}
