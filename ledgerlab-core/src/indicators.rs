//! Moving averages and crossover predicates over close-price series.
//!
//! Averages are computed over a raw `&[f64]` so strategies can feed them any
//! extracted series. The first `period - 1` slots of every output are NaN;
//! strategies treat NaN as "warmup, no signal".

use serde::{Deserialize, Serialize};

/// Which weighting a moving average applies to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    Simple,
    Weighted,
    Exponential,
}

impl MaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MaKind::Simple => "simple",
            MaKind::Weighted => "weighted",
            MaKind::Exponential => "exponential",
        }
    }
}

/// Moving average of `values` over `period`, NaN until the window fills.
///
/// Weighted uses linear weights 1..=period (newest heaviest). Exponential
/// seeds with the SMA of the first window, then recurses with
/// alpha = 2 / (period + 1).
pub fn moving_average(values: &[f64], period: usize, kind: MaKind) -> Vec<f64> {
    match kind {
        MaKind::Simple => simple(values, period),
        MaKind::Weighted => weighted(values, period),
        MaKind::Exponential => exponential(values, period),
    }
}

fn simple(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;
    for i in period..n {
        sum = sum - values[i - period] + values[i];
        result[i] = sum / period as f64;
    }
    result
}

fn weighted(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let denom = (period * (period + 1)) as f64 / 2.0;
    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        let num: f64 = window
            .iter()
            .enumerate()
            .map(|(j, &v)| (j + 1) as f64 * v)
            .sum();
        result[i] = num / denom;
    }
    result
}

fn exponential(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = seed;
    let mut prev = seed;
    for i in period..n {
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }
    result
}

/// True where `fast` crosses from at-or-below `slow` to strictly above.
///
/// Index 0 is never a crossing; positions where either series is NaN on
/// either side of the step are false.
pub fn cross_over(fast: &[f64], slow: &[f64]) -> Vec<bool> {
    cross(fast, slow, |prev_f, prev_s, f, s| prev_f <= prev_s && f > s)
}

/// True where `fast` crosses from at-or-above `slow` to strictly below.
pub fn cross_under(fast: &[f64], slow: &[f64]) -> Vec<bool> {
    cross(fast, slow, |prev_f, prev_s, f, s| prev_f >= prev_s && f < s)
}

fn cross(fast: &[f64], slow: &[f64], hit: impl Fn(f64, f64, f64, f64) -> bool) -> Vec<bool> {
    let n = fast.len().min(slow.len());
    let mut result = vec![false; n];
    for i in 1..n {
        let (pf, ps, f, s) = (fast[i - 1], slow[i - 1], fast[i], slow[i]);
        if pf.is_nan() || ps.is_nan() || f.is_nan() || s.is_nan() {
            continue;
        }
        result[i] = hit(pf, ps, f, s);
    }
    result
}
