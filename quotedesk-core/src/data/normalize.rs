//! Ticker symbol normalization.
//!
//! Trims and uppercases free-text input. Symbols carrying a recognized
//! foreign-market suffix are flagged so the caller can warn that the data
//! source likely does not cover them — the fetch still proceeds.

/// Market suffixes the quote provider is known to handle poorly.
const FOREIGN_SUFFIXES: &[&str] = &[".T", ".TO", ".L", ".HK"];

/// A normalized ticker symbol plus an optional foreign-market flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSymbol {
    pub symbol: String,
    /// The recognized foreign-market suffix, if the symbol ends with one.
    pub foreign_suffix: Option<&'static str>,
}

impl NormalizedSymbol {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_empty()
    }
}

/// Normalize raw user input: trim whitespace, uppercase, flag foreign suffixes.
///
/// Empty or whitespace-only input normalizes to the empty string. Pure; never
/// fails.
pub fn normalize(raw: &str) -> NormalizedSymbol {
    let symbol = raw.trim().to_uppercase();
    let foreign_suffix = FOREIGN_SUFFIXES
        .iter()
        .find(|suffix| symbol.ends_with(*suffix))
        .copied();
    NormalizedSymbol {
        symbol,
        foreign_suffix,
    }
}
