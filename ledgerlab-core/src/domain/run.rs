//! RunId — structured identity of one simulation run.
//!
//! A run is one strategy against one symbol over one date range at one
//! timeframe. The identity is a value-equal record (not a delimited string)
//! so downstream code never has to parse fields back out of it.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Timeframe;

/// Partition key for all ledger rows belonging to one backtest.
///
/// Stable and reproducible: two runs with identical inputs compare equal and
/// produce the same [`fingerprint`](RunId::fingerprint), so replays
/// deduplicate instead of double-recording.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    /// Strategy descriptor, e.g. `SmaSignal(9)`.
    pub strategy: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RunId {
    pub fn new(
        strategy: impl Into<String>,
        symbol: impl Into<String>,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            symbol: symbol.into(),
            timeframe,
            start,
            end,
        }
    }

    /// Deterministic content hash of the identity, used to name export
    /// directories. BLAKE3 over a canonical JSON encoding, stable across
    /// builds and platforms.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::json!({
            "strategy": &self.strategy,
            "symbol": &self.symbol,
            "timeframe": self.timeframe.as_str(),
            "start": self.start.to_string(),
            "end": self.end.to_string(),
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} {} ({} to {})",
            self.strategy, self.symbol, self.timeframe, self.start, self.end
        )
    }
}
