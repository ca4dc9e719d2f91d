//! Strategy interfaces and the bundled strategies.
//!
//! Two evaluation shapes exist and the orchestrator dispatches on which one a
//! strategy implements:
//!
//! - Stepwise: called once per bar with the growing window of history up to
//!   and including that bar. Stepwise strategies size entries from capital,
//!   so their transactions carry shares and values.
//! - Vectorized: called once with the whole series, returning per-bar signal
//!   columns. Vector strategies are price-only; their P/L is the raw price
//!   delta per round trip.

pub mod close_market;
pub mod ma_crossover;
pub mod sma;

pub use close_market::CloseMarket;
pub use ma_crossover::MaCrossover;
pub use sma::SmaSignal;

use chrono::{DateTime, Utc};

use crate::domain::PriceBar;

/// A strategy's decision on one bar: act at this price, stamped with the
/// bar's date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub price: f64,
    pub date: DateTime<Utc>,
}

/// Per-bar signal columns from a vectorized strategy. Both vectors are the
/// same length as the input series; `Some(price)` means act on that bar.
#[derive(Debug, Clone, Default)]
pub struct SignalSeries {
    pub buy: Vec<Option<f64>>,
    pub sell: Vec<Option<f64>>,
}

/// A labelled overlay aligned to the input series, for charting. NaN marks
/// warmup rows with no value. The engine never reads these; they exist for
/// presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Bar-by-bar strategy over a growing history window.
///
/// `window` always ends at the bar under evaluation; implementations must not
/// look past `window.last()`.
pub trait StepwiseStrategy: Send + Sync {
    /// Entry decision while flat.
    fn buy(&self, window: &[PriceBar]) -> Option<Signal>;

    /// Exit decision while a position is open.
    fn sell(&self, window: &[PriceBar]) -> Option<Signal>;

    /// Fraction of remaining capital committed per entry, in (0, 1].
    fn position_sizing(&self) -> f64 {
        1.0
    }

    /// Chart overlays derived from the series (e.g. the moving average a
    /// signal keys off). Default: none.
    fn plot_elements(&self, _series: &[PriceBar]) -> Vec<PlotSeries> {
        Vec::new()
    }

    fn describe(&self) -> String;
}

/// Whole-series strategy evaluated once up front.
pub trait VectorStrategy: Send + Sync {
    fn generate_signal(&self, series: &[PriceBar]) -> SignalSeries;

    /// Chart overlays derived from the series. Default: none.
    fn plot_elements(&self, _series: &[PriceBar]) -> Vec<PlotSeries> {
        Vec::new()
    }

    fn describe(&self) -> String;
}

/// A strategy tagged by its evaluation shape.
pub enum Strategy {
    Stepwise(Box<dyn StepwiseStrategy>),
    Vector(Box<dyn VectorStrategy>),
}

impl Strategy {
    pub fn describe(&self) -> String {
        match self {
            Strategy::Stepwise(s) => s.describe(),
            Strategy::Vector(s) => s.describe(),
        }
    }

    pub fn plot_elements(&self, series: &[PriceBar]) -> Vec<PlotSeries> {
        match self {
            Strategy::Stepwise(s) => s.plot_elements(series),
            Strategy::Vector(s) => s.plot_elements(series),
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Stepwise(s) => write!(f, "Strategy::Stepwise({})", s.describe()),
            Strategy::Vector(s) => write!(f, "Strategy::Vector({})", s.describe()),
        }
    }
}
