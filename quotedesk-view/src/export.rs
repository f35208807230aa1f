//! CSV export for the export collaborator.
//!
//! Tables serialize as UTF-8 with a byte-order mark (so spreadsheet tools
//! detect the encoding), one row per bar, with the moving-average columns
//! appended when the view was annotated. Missing values are empty cells.
//! The parser exists for the export/import round trip and file-based tests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use quotedesk_core::data::resample::ResamplePeriod;
use quotedesk_core::domain::{Bar, OhlcvSeries};
use quotedesk_core::indicators::MovingAverages;

/// UTF-8 byte-order mark prepended to every export.
pub const BOM: char = '\u{feff}';

/// Serialize a table (and optional average columns) to CSV text.
pub fn to_csv(series: &OhlcvSeries, averages: Option<&MovingAverages>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match averages {
        Some(_) => wtr.write_record([
            "date", "open", "high", "low", "close", "volume", "sma_20", "sma_50",
        ])?,
        None => wtr.write_record(["date", "open", "high", "low", "close", "volume"])?,
    }

    for (i, bar) in series.bars().iter().enumerate() {
        let mut record = vec![
            bar.date.to_string(),
            price_cell(bar.open),
            price_cell(bar.high),
            price_cell(bar.low),
            price_cell(bar.close),
            bar.volume.to_string(),
        ];
        if let Some(avg) = averages {
            record.push(price_cell(avg.sma20[i]));
            record.push(price_cell(avg.sma50[i]));
        }
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    let body = String::from_utf8(data).context("CSV output is not valid UTF-8")?;
    Ok(format!("{BOM}{body}"))
}

/// Parse CSV text produced by [`to_csv`] back into a series. Extra columns
/// (the averages) are ignored; empty price cells come back as missing.
pub fn parse_csv(text: &str) -> Result<OhlcvSeries> {
    let body = text.strip_prefix(BOM).unwrap_or(text);
    let mut rdr = csv::Reader::from_reader(body.as_bytes());

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV record at row {i}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date = NaiveDate::parse_from_str(field(0), "%Y-%m-%d")
            .with_context(|| format!("bad date '{}' at row {i}", field(0)))?;
        let volume = field(5)
            .parse::<u64>()
            .with_context(|| format!("bad volume '{}' at row {i}", field(5)))?;

        bars.push(Bar {
            date,
            open: parse_price(field(1)),
            high: parse_price(field(2)),
            low: parse_price(field(3)),
            close: parse_price(field(4)),
            volume,
        });
    }

    Ok(OhlcvSeries::from_bars(bars))
}

/// Suggested download filename embedding symbol, period, and current date.
pub fn suggested_filename(symbol: &str, period: ResamplePeriod, today: NaiveDate) -> String {
    format!("{symbol}_{}_{today}.csv", period.label())
}

/// Write an export to disk, returning the path actually written.
pub fn save_csv(
    dir: &Path,
    filename: &str,
    series: &OhlcvSeries,
    averages: Option<&MovingAverages>,
) -> Result<PathBuf> {
    let text = to_csv(series, averages)?;
    let path = dir.join(filename);
    std::fs::write(&path, text)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    Ok(path)
}

fn price_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.4}")
    }
}

fn parse_price(cell: &str) -> f64 {
    if cell.is_empty() {
        f64::NAN
    } else {
        cell.parse().unwrap_or(f64::NAN)
    }
}
