//! ClosedTrade — a paired buy+sell forming one realized P/L observation.
//!
//! Derived by the resolver from ledger rows, never persisted directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RunId, Timeframe};

/// A complete round trip: Buy row joined with its Sell row on
/// `(run, trade_seq)`.
///
/// Two P/L conventions exist, selected by the presence of `shares`/values:
/// capital-sized trades compute P/L from fee-inclusive values, price-only
/// trades from the raw price delta (unit return).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub run: RunId,
    pub trade_seq: u32,
    pub buy_date: DateTime<Utc>,
    pub buy_price: f64,
    pub buy_value: Option<f64>,
    pub sell_date: DateTime<Utc>,
    pub sell_price: f64,
    pub sell_value: Option<f64>,
    pub shares: Option<u64>,
    pub pnl: f64,
    /// Percent of this trade's buy value (capital-sized) or simple price
    /// return (price-only).
    pub pnl_pct: f64,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Holding period in whole bars at the run's timeframe: elapsed time
    /// divided by the bar duration, rounded down.
    pub fn bars_held(&self, timeframe: Timeframe) -> i64 {
        let elapsed = (self.sell_date - self.buy_date).num_seconds();
        elapsed / timeframe.bar_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn trade() -> ClosedTrade {
        ClosedTrade {
            run: RunId::new(
                "CloseMarket",
                "SPY",
                Timeframe::Day1,
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            ),
            trade_seq: 0,
            buy_date: date(2),
            buy_price: 100.0,
            buy_value: Some(300.0),
            sell_date: date(9),
            sell_price: 110.0,
            sell_value: Some(330.0),
            shares: Some(3),
            pnl: 30.0,
            pnl_pct: 10.0,
        }
    }

    #[test]
    fn winner_flag_matches_pnl_sign() {
        assert!(trade().is_winner());
        let mut loser = trade();
        loser.pnl = -5.0;
        assert!(!loser.is_winner());
    }

    #[test]
    fn bars_held_daily() {
        // Jan 2 to Jan 9 is 7 calendar days = 7 daily bars' worth of time,
        // or exactly one weekly bar.
        assert_eq!(trade().bars_held(Timeframe::Day1), 7);
        assert_eq!(trade().bars_held(Timeframe::Week1), 1);
    }
}
