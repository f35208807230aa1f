//! QuoteDesk Core — domain types, quote provider, caching, resampling, indicators.
//!
//! This crate contains the data pipeline behind the viewer:
//! - Domain types (daily OHLCV bars and ordered series)
//! - Symbol normalization with foreign-market advisories
//! - Quote provider trait and the Alpha Vantage client
//! - In-memory TTL cache and last-known-good store
//! - Weekly/monthly resampling
//! - Trailing simple moving averages

pub mod data;
pub mod domain;
pub mod indicators;
