//! Baseline strategy: act on every bar at its close.
//!
//! While flat it buys the current close; while open it sells the current
//! close. Round trips therefore span exactly one bar, which makes this the
//! reference strategy for ledger plumbing tests and a fee-sensitivity
//! baseline.

use crate::domain::PriceBar;
use crate::strategy::{Signal, StepwiseStrategy};

#[derive(Debug, Clone)]
pub struct CloseMarket {
    sizing: f64,
}

impl CloseMarket {
    pub fn new(sizing: f64) -> Self {
        Self { sizing }
    }
}

impl Default for CloseMarket {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl StepwiseStrategy for CloseMarket {
    fn buy(&self, window: &[PriceBar]) -> Option<Signal> {
        window.last().map(|bar| Signal {
            price: bar.close,
            date: bar.date,
        })
    }

    fn sell(&self, window: &[PriceBar]) -> Option<Signal> {
        window.last().map(|bar| Signal {
            price: bar.close,
            date: bar.date,
        })
    }

    fn position_sizing(&self) -> f64 {
        self.sizing
    }

    fn describe(&self) -> String {
        "CloseMarket".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        PriceBar {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
        }
    }

    #[test]
    fn signals_at_last_close() {
        let strat = CloseMarket::default();
        let window = [bar(2, 100.0), bar(3, 101.5)];
        let signal = strat.buy(&window).unwrap();
        assert_eq!(signal.price, 101.5);
        assert_eq!(signal.date, window[1].date);
        assert_eq!(strat.sell(&window).unwrap().price, 101.5);
    }

    #[test]
    fn no_signal_on_empty_window() {
        let strat = CloseMarket::default();
        assert!(strat.buy(&[]).is_none());
        assert!(strat.sell(&[]).is_none());
    }
}
