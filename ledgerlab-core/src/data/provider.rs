//! Price provider trait and structured error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{PriceBar, Timeframe};

/// Structured error types for price-series operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no price data for '{symbol}' at {timeframe} between {start} and {end}")]
    NoData {
        symbol: String,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    Format(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("ticker file '{path}': {reason}")]
    TickerFile { path: String, reason: String },
}

/// Trait for price providers.
///
/// Implementations return bars sorted by date with duplicates removed;
/// callers may assume the series is ready for simulation. Zero bars in the
/// requested range is `DataError::NoData`, never an empty vector.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch OHLC bars for a symbol over a date range at the given timeframe.
    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError>;
}
