//! SMA breakout strategy.
//!
//! The reference line is the simple moving average of the `window` closes
//! immediately before the bar under evaluation, so a decision on bar `i`
//! needs `window + 1` bars of history. A buy fires when the bar's high
//! trades through the line from above; a sell fires when its low trades
//! through from below. In both cases the fill price is the line itself,
//! modelling a resting order at the average.

use crate::domain::PriceBar;
use crate::indicators::{moving_average, MaKind};
use crate::strategy::{PlotSeries, Signal, StepwiseStrategy};

#[derive(Debug, Clone)]
pub struct SmaSignal {
    window: usize,
    sizing: f64,
}

impl SmaSignal {
    pub fn new(window: usize, sizing: f64) -> Self {
        Self { window, sizing }
    }

    /// SMA of the `window` closes preceding the last bar, or None during
    /// warmup.
    fn prior_sma(&self, window: &[PriceBar]) -> Option<f64> {
        if self.window == 0 || window.len() < self.window + 1 {
            return None;
        }
        let tail = &window[window.len() - 1 - self.window..window.len() - 1];
        Some(tail.iter().map(|b| b.close).sum::<f64>() / self.window as f64)
    }
}

impl StepwiseStrategy for SmaSignal {
    fn buy(&self, window: &[PriceBar]) -> Option<Signal> {
        let sma = self.prior_sma(window)?;
        let bar = window.last()?;
        (bar.high > sma).then_some(Signal {
            price: sma,
            date: bar.date,
        })
    }

    fn sell(&self, window: &[PriceBar]) -> Option<Signal> {
        let sma = self.prior_sma(window)?;
        let bar = window.last()?;
        (bar.low < sma).then_some(Signal {
            price: sma,
            date: bar.date,
        })
    }

    fn position_sizing(&self) -> f64 {
        self.sizing
    }

    fn plot_elements(&self, series: &[PriceBar]) -> Vec<PlotSeries> {
        let closes: Vec<f64> = series.iter().map(|b| b.close).collect();
        vec![PlotSeries {
            label: format!("SMA({})", self.window),
            values: moving_average(&closes, self.window, MaKind::Simple),
        }]
    }

    fn describe(&self) -> String {
        format!("Sma({})", self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        PriceBar {
            date,
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn warmup_produces_no_signal() {
        let strat = SmaSignal::new(3, 1.0);
        // Only 3 bars; a window of 3 needs 4.
        let bars = [
            bar(2, 10.0, 11.0, 9.0, 10.0),
            bar(3, 10.0, 11.0, 9.0, 10.0),
            bar(4, 10.0, 11.0, 9.0, 10.0),
        ];
        assert!(strat.buy(&bars).is_none());
        assert!(strat.sell(&bars).is_none());
    }

    #[test]
    fn buy_fires_at_the_average_price() {
        let strat = SmaSignal::new(3, 1.0);
        // Prior closes 10, 11, 12 → SMA 11; last bar's high 11.5 > 11.
        let bars = [
            bar(2, 10.0, 10.0, 10.0, 10.0),
            bar(3, 11.0, 11.0, 11.0, 11.0),
            bar(4, 12.0, 12.0, 12.0, 12.0),
            bar(5, 11.2, 11.5, 11.1, 11.3),
        ];
        let signal = strat.buy(&bars).unwrap();
        assert_eq!(signal.price, 11.0);
        assert_eq!(signal.date, bars[3].date);
    }

    #[test]
    fn buy_needs_high_above_the_line() {
        let strat = SmaSignal::new(3, 1.0);
        // SMA 11; last bar tops out exactly at 11.
        let bars = [
            bar(2, 10.0, 10.0, 10.0, 10.0),
            bar(3, 11.0, 11.0, 11.0, 11.0),
            bar(4, 12.0, 12.0, 12.0, 12.0),
            bar(5, 10.5, 11.0, 10.2, 10.8),
        ];
        assert!(strat.buy(&bars).is_none());
    }

    #[test]
    fn sell_fires_when_low_breaks_the_line() {
        let strat = SmaSignal::new(3, 1.0);
        // SMA 11; last bar's low 10.5 < 11.
        let bars = [
            bar(2, 10.0, 10.0, 10.0, 10.0),
            bar(3, 11.0, 11.0, 11.0, 11.0),
            bar(4, 12.0, 12.0, 12.0, 12.0),
            bar(5, 11.2, 11.6, 10.5, 11.0),
        ];
        let signal = strat.sell(&bars).unwrap();
        assert_eq!(signal.price, 11.0);
    }

    #[test]
    fn plot_overlay_is_the_sma_line() {
        let strat = SmaSignal::new(2, 1.0);
        let bars = [
            bar(2, 10.0, 10.0, 10.0, 10.0),
            bar(3, 20.0, 20.0, 20.0, 20.0),
            bar(4, 30.0, 30.0, 30.0, 30.0),
        ];
        let plots = strat.plot_elements(&bars);
        assert_eq!(plots.len(), 1);
        assert_eq!(plots[0].label, "SMA(2)");
        assert!(plots[0].values[0].is_nan());
        assert_eq!(&plots[0].values[1..], &[15.0, 25.0]);
    }

    #[test]
    fn current_bar_is_excluded_from_the_average() {
        let strat = SmaSignal::new(2, 1.0);
        // Prior closes 10, 20 → SMA 15. Were the current close (90) included
        // over any two bars, the line would differ.
        let bars = [
            bar(2, 10.0, 10.0, 10.0, 10.0),
            bar(3, 20.0, 20.0, 20.0, 20.0),
            bar(4, 90.0, 90.0, 16.0, 90.0),
        ];
        assert_eq!(strat.buy(&bars).unwrap().price, 15.0);
    }
}
