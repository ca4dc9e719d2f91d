//! PriceBar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC bar for a single symbol at one timeframe step.
///
/// Bars carry a full timestamp rather than a calendar date because intraday
/// timeframes (1m .. 90m) produce several bars per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// Basic OHLC sanity check: finite values, high >= low, and high/low
    /// bracket both open and close.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Sort a series ascending by date and drop duplicate dates, keeping the
/// first occurrence.
///
/// Gaps (missing sessions) are tolerated; duplicate dates are not — the
/// simulation requires unique bar dates because `(run, date, action)` is the
/// ledger's natural key.
pub fn normalize_series(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

/// True if the series is sorted strictly ascending by date.
pub fn is_sorted_unique(bars: &[PriceBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}
