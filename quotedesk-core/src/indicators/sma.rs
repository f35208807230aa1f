//! Simple Moving Average (SMA).
//!
//! Rolling mean over a trailing window, inclusive of the current bar.
//! No partial windows: the first `period - 1` outputs are NaN, and so is any
//! window containing a missing close.

use crate::domain::OhlcvSeries;

/// Window sizes the viewer annotates with.
pub const SHORT_WINDOW: usize = 20;
pub const LONG_WINDOW: usize = 50;

/// Trailing moving-average columns aligned with the bars they annotate.
/// `NAN` marks positions where a full window does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverages {
    pub sma20: Vec<f64>,
    pub sma50: Vec<f64>,
}

/// Annotate a series with the standard 20/50-bar close averages.
///
/// Pure: the input series is untouched; the result is aligned by index.
pub fn annotate(series: &OhlcvSeries) -> MovingAverages {
    let closes = series.closes();
    MovingAverages {
        sma20: sma(&closes, SHORT_WINDOW),
        sma50: sma(&closes, LONG_WINDOW),
    }
}

/// Trailing simple moving average of `values` over `period` samples.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    // Compute the initial window sum.
    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }
    if !nan_in_window {
        result[period - 1] = sum / period as f64;
    }

    // Roll the window forward.
    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        sum = sum - leaving + entering;

        // NaN poisons the rolled sum, so rescan the window whenever one was
        // involved on either edge.
        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            nan_in_window = false;
            sum = 0.0;
            for &v in &values[(i + 1 - period)..=i] {
                if v.is_nan() {
                    nan_in_window = true;
                }
                sum += v;
            }
            if nan_in_window {
                continue;
            }
        }

        result[i] = sum / period as f64;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OhlcvSeries;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let values = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let result = sma(&values, 5);

        assert_eq!(result.len(), 7);
        for i in 0..4 {
            assert!(result[i].is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_the_series_itself() {
        let result = sma(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_propagation() {
        let mut values = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        values[2] = f64::NAN;
        let result = sma(&values, 3);
        // Windows containing index 2 are all NaN; the first clean window is
        // [13,14,15] at index 5.
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_too_few_values() {
        let result = sma(&[10.0, 11.0], 5);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn annotate_constant_closes() {
        // 25 bars of constant close 10: the 20-bar average is missing for
        // the first 19 rows and exactly 10 afterwards; the 50-bar average
        // never warms up.
        let series = OhlcvSeries::from_bars(make_bars(&[10.0; 25]));
        let averages = annotate(&series);

        assert_eq!(averages.sma20.len(), 25);
        for i in 0..19 {
            assert!(averages.sma20[i].is_nan(), "expected NaN at row {i}");
        }
        for i in 19..25 {
            assert_approx(averages.sma20[i], 10.0, DEFAULT_EPSILON);
        }
        assert!(averages.sma50.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn annotate_leaves_series_untouched() {
        let series = OhlcvSeries::from_bars(make_bars(&[10.0, 11.0, 12.0]));
        let before = series.clone();
        let _ = annotate(&series);
        assert_eq!(series, before);
    }
}
