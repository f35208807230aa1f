//! Resampling daily bars into weekly or monthly buckets.
//!
//! Buckets are calendar-aligned (ISO week, calendar month) and aggregate
//! per column: first open, max high, min low, last close, summed volume.
//! Missing price values are skipped; a bucket whose price aggregates have no
//! surviving inputs is dropped outright, never interpolated. Output bars are
//! labeled with the bucket's calendar end date, so the series stays sorted
//! and a second resample over the same period is the identity.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, OhlcvSeries};

/// View period: daily passes the series through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResamplePeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ResamplePeriod {
    pub fn label(self) -> &'static str {
        match self {
            ResamplePeriod::Daily => "daily",
            ResamplePeriod::Weekly => "weekly",
            ResamplePeriod::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for ResamplePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ResamplePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "d" => Ok(ResamplePeriod::Daily),
            "weekly" | "w" => Ok(ResamplePeriod::Weekly),
            "monthly" | "m" => Ok(ResamplePeriod::Monthly),
            other => Err(format!("unknown period '{other}' (daily|weekly|monthly)")),
        }
    }
}

/// Aggregate a daily series into the requested period.
pub fn resample(series: &OhlcvSeries, period: ResamplePeriod) -> OhlcvSeries {
    if period == ResamplePeriod::Daily {
        return series.clone();
    }

    let mut out: Vec<Bar> = Vec::new();
    let mut current: Option<Bucket> = None;

    for bar in series.bars() {
        let key = bucket_key(bar.date, period);
        match current.as_mut() {
            Some(bucket) if bucket.key == key => bucket.absorb(bar),
            _ => {
                if let Some(done) = current.take() {
                    out.extend(done.finish(period));
                }
                let mut bucket = Bucket::new(key);
                bucket.absorb(bar);
                current = Some(bucket);
            }
        }
    }
    if let Some(done) = current {
        out.extend(done.finish(period));
    }

    OhlcvSeries::from_bars(out)
}

/// Calendar bucket identity: (ISO year, ISO week) or (year, month).
fn bucket_key(date: NaiveDate, period: ResamplePeriod) -> (i32, u32) {
    match period {
        ResamplePeriod::Daily => unreachable!("daily is an identity pass"),
        ResamplePeriod::Weekly => (date.iso_week().year(), date.iso_week().week()),
        ResamplePeriod::Monthly => (date.year(), date.month()),
    }
}

/// The calendar end of the bucket containing `date`: the ISO week's Sunday,
/// or the last day of the month.
fn bucket_end(date: NaiveDate, period: ResamplePeriod) -> NaiveDate {
    match period {
        ResamplePeriod::Daily => date,
        ResamplePeriod::Weekly => {
            let to_sunday = 7 - date.weekday().number_from_monday();
            date + chrono::Duration::days(i64::from(to_sunday))
        }
        ResamplePeriod::Monthly => {
            let first_next = if date.month() == 12 {
                NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
            };
            first_next.unwrap().pred_opt().unwrap()
        }
    }
}

struct Bucket {
    key: (i32, u32),
    last_date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: u64,
}

impl Bucket {
    fn new(key: (i32, u32)) -> Self {
        Self {
            key,
            last_date: NaiveDate::MIN,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: 0,
        }
    }

    /// Fold one bar in, skipping missing price values.
    fn absorb(&mut self, bar: &Bar) {
        self.last_date = bar.date;
        if !bar.open.is_nan() && self.open.is_none() {
            self.open = Some(bar.open);
        }
        if !bar.high.is_nan() {
            self.high = Some(self.high.map_or(bar.high, |h| h.max(bar.high)));
        }
        if !bar.low.is_nan() {
            self.low = Some(self.low.map_or(bar.low, |l| l.min(bar.low)));
        }
        if !bar.close.is_nan() {
            self.close = Some(bar.close);
        }
        self.volume += bar.volume;
    }

    /// Produce the aggregated bar, or nothing when a price aggregate had no
    /// surviving inputs.
    fn finish(self, period: ResamplePeriod) -> Option<Bar> {
        Some(Bar {
            date: bucket_end(self.last_date, period),
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume,
        })
    }
}
