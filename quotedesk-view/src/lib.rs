//! QuoteDesk View — request orchestration around the core pipeline.
//!
//! This crate contains the per-render plumbing:
//! - Configuration (TOML knobs + credential from the environment)
//! - The view pipeline: normalize → cache-or-fetch → fallback → resample →
//!   window → annotate
//! - CSV export with byte-order mark and suggested filenames
//! - The notification interface for user-visible acknowledgments

pub mod config;
pub mod export;
pub mod notify;
pub mod pipeline;

pub use config::AppConfig;
pub use notify::{Notifier, StdoutNotifier};
pub use pipeline::{DataStatus, ViewError, ViewRequest, ViewResult, ViewSession};
