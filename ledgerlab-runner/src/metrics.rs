//! Performance aggregation — pure functions from closed trades to statistics.
//!
//! A run with zero closed trades is `PerformanceSummary::NoTrades`, a distinct
//! state rather than a report full of zeros: "the strategy never traded" and
//! "the strategy traded to a net zero" must not be confused downstream.

use serde::{Deserialize, Serialize};

use ledgerlab_core::domain::{ClosedTrade, PriceBar, RunId};

/// Aggregate performance for a run, or the explicit absence of trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerformanceSummary {
    NoTrades { run: RunId },
    Trades(PerformanceReport),
}

impl PerformanceSummary {
    pub fn report(&self) -> Option<&PerformanceReport> {
        match self {
            PerformanceSummary::NoTrades { .. } => None,
            PerformanceSummary::Trades(report) => Some(report),
        }
    }
}

/// Buy-and-hold baseline over the same bar range: the price delta from the
/// first close to the last, and that delta as a percentage of the first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyAndHold {
    pub pnl: f64,
    pub pnl_pct: f64,
}

/// Aggregate statistics over one run's closed trades.
///
/// `net_pnl_pct` is a percentage of the initial capital; the per-trade
/// `pnl_pct` on `ClosedTrade` is a percentage of that trade's buy value.
/// The two conventions are never mixed. Win/loss aggregates are `None`
/// rather than zero when there were no winners (or no losers).
///
/// A win is strictly `pnl > 0`, a loss strictly `pnl < 0`; break-even
/// trades count toward `trade_count` but neither column, so
/// `winning_trades + losing_trades` can fall short of `trade_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub run: RunId,
    pub net_pnl: f64,
    pub net_pnl_pct: f64,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winners / trade count, as a fraction in [0, 1].
    pub win_rate: f64,
    pub largest_win: Option<f64>,
    pub largest_loss: Option<f64>,
    pub avg_trade: f64,
    pub avg_win: Option<f64>,
    pub avg_loss: Option<f64>,
    /// Holding periods in whole bars of the run's timeframe.
    pub avg_holding_bars: f64,
    pub longest_holding_bars: i64,
    pub shortest_holding_bars: i64,
    pub buy_and_hold: Option<BuyAndHold>,
}

/// Aggregate `closed` into a summary. `bars_ref`, when given, supplies the
/// buy-and-hold baseline over the same series the strategy saw.
pub fn summarize(
    run: &RunId,
    closed: &[ClosedTrade],
    bars_ref: Option<&[PriceBar]>,
    initial_capital: f64,
) -> PerformanceSummary {
    if closed.is_empty() {
        return PerformanceSummary::NoTrades { run: run.clone() };
    }

    let net_pnl: f64 = closed.iter().map(|t| t.pnl).sum();
    let net_pnl_pct = if initial_capital > 0.0 {
        net_pnl / initial_capital * 100.0
    } else {
        0.0
    };

    let winners: Vec<f64> = closed.iter().filter(|t| t.is_winner()).map(|t| t.pnl).collect();
    let losers: Vec<f64> = closed.iter().filter(|t| t.pnl < 0.0).map(|t| t.pnl).collect();

    let holding: Vec<i64> = closed.iter().map(|t| t.bars_held(run.timeframe)).collect();
    let avg_holding_bars = holding.iter().sum::<i64>() as f64 / holding.len() as f64;

    PerformanceSummary::Trades(PerformanceReport {
        run: run.clone(),
        net_pnl,
        net_pnl_pct,
        trade_count: closed.len(),
        winning_trades: winners.len(),
        losing_trades: losers.len(),
        win_rate: winners.len() as f64 / closed.len() as f64,
        largest_win: max_f64(&winners),
        largest_loss: min_f64(&losers),
        avg_trade: net_pnl / closed.len() as f64,
        avg_win: mean_f64(&winners),
        avg_loss: mean_f64(&losers),
        avg_holding_bars,
        longest_holding_bars: holding.iter().copied().max().unwrap_or(0),
        shortest_holding_bars: holding.iter().copied().min().unwrap_or(0),
        buy_and_hold: bars_ref.and_then(buy_and_hold),
    })
}

/// Price-only buy-and-hold over a bar series: enter at the first close, exit
/// at the last. None for an empty series.
pub fn buy_and_hold(bars: &[PriceBar]) -> Option<BuyAndHold> {
    let first = bars.first()?.close;
    let last = bars.last()?.close;
    if first <= 0.0 {
        return None;
    }
    let pnl = last - first;
    Some(BuyAndHold {
        pnl,
        pnl_pct: pnl / first * 100.0,
    })
}

fn mean_f64(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn max_f64(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn min_f64(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use ledgerlab_core::domain::Timeframe;

    fn run() -> RunId {
        RunId::new(
            "test",
            "SPY",
            Timeframe::Day1,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
        )
    }

    fn date(day: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn trade(seq: u32, buy_day: u32, sell_day: u32, pnl: f64) -> ClosedTrade {
        ClosedTrade {
            run: run(),
            trade_seq: seq,
            buy_date: date(buy_day),
            buy_price: 100.0,
            buy_value: Some(100.0),
            sell_date: date(sell_day),
            sell_price: 100.0 + pnl,
            sell_value: Some(100.0 + pnl),
            shares: Some(1),
            pnl,
            pnl_pct: pnl,
        }
    }

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: (base + Duration::days(i as i64))
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .and_utc(),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    #[test]
    fn no_trades_is_distinct_from_zero_profit() {
        let summary = summarize(&run(), &[], None, 1000.0);
        assert!(matches!(summary, PerformanceSummary::NoTrades { .. }));
        assert!(summary.report().is_none());

        let zero = summarize(&run(), &[trade(0, 2, 3, 0.0)], None, 1000.0);
        assert!(zero.report().is_some());
    }

    #[test]
    fn aggregates_wins_and_losses() {
        let closed = vec![
            trade(0, 2, 4, 30.0),
            trade(1, 5, 6, -10.0),
            trade(2, 8, 12, 50.0),
        ];
        let report = match summarize(&run(), &closed, None, 1000.0) {
            PerformanceSummary::Trades(r) => r,
            other => panic!("expected trades, got {other:?}"),
        };

        assert_eq!(report.trade_count, 3);
        assert_eq!(report.winning_trades, 2);
        assert_eq!(report.losing_trades, 1);
        assert!((report.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.net_pnl, 70.0);
        assert!((report.net_pnl_pct - 7.0).abs() < 1e-12);
        assert_eq!(report.largest_win, Some(50.0));
        assert_eq!(report.largest_loss, Some(-10.0));
        assert_eq!(report.avg_win, Some(40.0));
        assert_eq!(report.avg_loss, Some(-10.0));
        assert!((report.avg_trade - 70.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn holding_periods_are_whole_bars() {
        // Held 2 days, 1 day, 4 days.
        let closed = vec![
            trade(0, 2, 4, 10.0),
            trade(1, 5, 6, 10.0),
            trade(2, 8, 12, 10.0),
        ];
        let report = summarize(&run(), &closed, None, 1000.0)
            .report()
            .cloned()
            .unwrap();
        assert_eq!(report.longest_holding_bars, 4);
        assert_eq!(report.shortest_holding_bars, 1);
        assert!((report.avg_holding_bars - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn break_even_trades_count_in_neither_column() {
        let closed = vec![
            trade(0, 2, 3, 10.0),
            trade(1, 4, 5, 0.0),
            trade(2, 6, 7, -5.0),
        ];
        let report = summarize(&run(), &closed, None, 1000.0)
            .report()
            .cloned()
            .unwrap();
        assert_eq!(report.trade_count, 3);
        assert_eq!(report.winning_trades, 1);
        assert_eq!(report.losing_trades, 1);
        assert!((report.win_rate - 1.0 / 3.0).abs() < 1e-12);
        // The break-even trade must not drag the loss average toward zero.
        assert_eq!(report.avg_loss, Some(-5.0));
        assert_eq!(report.avg_win, Some(10.0));
    }

    #[test]
    fn all_winners_leaves_loss_aggregates_empty() {
        let closed = vec![trade(0, 2, 3, 10.0)];
        let report = summarize(&run(), &closed, None, 1000.0)
            .report()
            .cloned()
            .unwrap();
        assert_eq!(report.losing_trades, 0);
        assert_eq!(report.avg_loss, None);
        assert_eq!(report.largest_loss, None);
        assert_eq!(report.win_rate, 1.0);
    }

    #[test]
    fn buy_and_hold_fifty_to_seventy_five_is_fifty_percent() {
        let baseline = buy_and_hold(&bars(&[50.0, 60.0, 40.0, 75.0])).unwrap();
        assert_eq!(baseline.pnl, 25.0);
        assert_eq!(baseline.pnl_pct, 50.0);
    }

    #[test]
    fn buy_and_hold_flows_into_the_report() {
        let closed = vec![trade(0, 2, 3, 10.0)];
        let series = bars(&[50.0, 75.0]);
        let report = summarize(&run(), &closed, Some(&series), 1000.0)
            .report()
            .cloned()
            .unwrap();
        assert_eq!(report.buy_and_hold, Some(BuyAndHold { pnl: 25.0, pnl_pct: 50.0 }));
    }
}
