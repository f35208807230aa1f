//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single trading period (a day, or a resampled week/month).
///
/// Price fields use `f64::NAN` as the explicit missing value: a provider row
/// whose field failed numeric coercion keeps a NaN there instead of aborting
/// the whole fetch. Volume has no missing state — unparseable volumes are
/// stored as 0, which is neutral under aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any price field is missing.
    pub fn has_missing(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Returns true if every price field is missing (nothing to display).
    pub fn is_blank(&self) -> bool {
        self.open.is_nan() && self.high.is_nan() && self.low.is_nan() && self.close.is_nan()
    }
}

/// An ordered series of bars: dates strictly increasing, no duplicates.
///
/// The constructor enforces the invariant by sorting ascending and keeping
/// the first occurrence of each date. Derived series (resampled, windowed)
/// are new values; nothing mutates a series in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    /// Build a series from raw bars, sorting by date and dropping duplicate
    /// dates (first occurrence wins).
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Closing prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The trailing `n` bars as a new series (the whole series if shorter).
    pub fn tail(&self, n: usize) -> OhlcvSeries {
        let start = self.bars.len().saturating_sub(n);
        Self {
            bars: self.bars[start..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn from_bars_sorts_ascending() {
        let series = OhlcvSeries::from_bars(vec![
            bar(2024, 1, 4, 103.0),
            bar(2024, 1, 2, 101.0),
            bar(2024, 1, 3, 102.0),
        ]);
        let dates: Vec<NaiveDate> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            ]
        );
    }

    #[test]
    fn from_bars_drops_duplicate_dates() {
        let series = OhlcvSeries::from_bars(vec![
            bar(2024, 1, 2, 101.0),
            bar(2024, 1, 2, 999.0),
            bar(2024, 1, 3, 102.0),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 101.0);
    }

    #[test]
    fn tail_takes_trailing_window() {
        let series = OhlcvSeries::from_bars(vec![
            bar(2024, 1, 2, 101.0),
            bar(2024, 1, 3, 102.0),
            bar(2024, 1, 4, 103.0),
        ]);
        let tail = series.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.bars()[0].close, 102.0);

        // Window larger than the series returns everything.
        assert_eq!(series.tail(10).len(), 3);
    }

    #[test]
    fn bar_detects_missing_fields() {
        let mut b = bar(2024, 1, 2, 101.0);
        assert!(!b.has_missing());
        b.close = f64::NAN;
        assert!(b.has_missing());
        assert!(!b.is_blank());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let b = bar(2024, 1, 2, 101.0);
        let json = serde_json::to_string(&b).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(b, deser);
    }
}
