//! Fast/slow moving-average crossover, evaluated over the whole series.
//!
//! Buys at the close of the bar where the fast average crosses above the
//! slow, sells where it crosses back under. Signals during either average's
//! warmup are suppressed by the NaN handling in the crossover predicates.

use crate::domain::PriceBar;
use crate::indicators::{cross_over, cross_under, moving_average, MaKind};
use crate::strategy::{PlotSeries, SignalSeries, VectorStrategy};

#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast: usize,
    slow: usize,
    kind: MaKind,
}

impl MaCrossover {
    pub fn new(fast: usize, slow: usize, kind: MaKind) -> Self {
        Self { fast, slow, kind }
    }
}

impl VectorStrategy for MaCrossover {
    fn generate_signal(&self, series: &[PriceBar]) -> SignalSeries {
        let closes: Vec<f64> = series.iter().map(|b| b.close).collect();
        let fast = moving_average(&closes, self.fast, self.kind);
        let slow = moving_average(&closes, self.slow, self.kind);
        let over = cross_over(&fast, &slow);
        let under = cross_under(&fast, &slow);

        let buy = closes
            .iter()
            .zip(&over)
            .map(|(&c, &hit)| hit.then_some(c))
            .collect();
        let sell = closes
            .iter()
            .zip(&under)
            .map(|(&c, &hit)| hit.then_some(c))
            .collect();
        SignalSeries { buy, sell }
    }

    fn plot_elements(&self, series: &[PriceBar]) -> Vec<PlotSeries> {
        let closes: Vec<f64> = series.iter().map(|b| b.close).collect();
        let prefix = match self.kind {
            MaKind::Simple => "SMA",
            MaKind::Weighted => "WMA",
            MaKind::Exponential => "EMA",
        };
        let name = |period| format!("{prefix}({period})");
        vec![
            PlotSeries {
                label: name(self.fast),
                values: moving_average(&closes, self.fast, self.kind),
            },
            PlotSeries {
                label: name(self.slow),
                values: moving_average(&closes, self.slow, self.kind),
            },
        ]
    }

    fn describe(&self) -> String {
        format!("MaCrossover({}/{} {})", self.fast, self.slow, self.kind.as_str())
    }
}
