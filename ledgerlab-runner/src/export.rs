//! CSV artifact export — transaction tape, closed positions, performance.
//!
//! `export_outcome` writes three sheets into a per-run directory named
//! `{symbol}_{fingerprint-prefix}/`. Money columns are rounded to two
//! decimals, unit-fraction metrics to four; dates are ISO (calendar dates
//! for daily-and-up timeframes, full timestamps for intraday).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use ledgerlab_core::domain::{ClosedTrade, Timeframe, Transaction};
use ledgerlab_core::error::ReportError;

use crate::metrics::PerformanceSummary;
use crate::runner::BacktestOutcome;

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub dir: PathBuf,
    pub transactions: PathBuf,
    pub closed_positions: PathBuf,
    pub performance: PathBuf,
}

/// Write the full artifact set for one backtest outcome.
///
/// Refuses to export a run that recorded no transactions — an empty tape is
/// `ReportError::NoTransactions`, not an empty file.
pub fn export_outcome(output_dir: &Path, outcome: &BacktestOutcome) -> Result<ExportPaths> {
    if outcome.transactions.is_empty() {
        return Err(ReportError::NoTransactions {
            run: outcome.run.clone(),
        }
        .into());
    }

    let dirname = format!(
        "{}_{}",
        outcome.run.symbol,
        &outcome.run.fingerprint()[..8]
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create export dir: {}", run_dir.display()))?;

    let transactions = run_dir.join("transactions.csv");
    std::fs::write(
        &transactions,
        transactions_csv(&outcome.transactions, outcome.run.timeframe)?,
    )?;

    let closed_positions = run_dir.join("closed_positions.csv");
    std::fs::write(
        &closed_positions,
        closed_positions_csv(&outcome.closed_trades, outcome.run.timeframe)?,
    )?;

    let performance = run_dir.join("performance.csv");
    std::fs::write(&performance, performance_csv(&outcome.summary)?)?;

    Ok(ExportPaths {
        dir: run_dir,
        transactions,
        closed_positions,
        performance,
    })
}

/// The transaction tape: one row per ledger entry, in insertion order.
pub fn transactions_csv(transactions: &[Transaction], timeframe: Timeframe) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["TICKER", "Date", "Action", "Price", "NumShares", "Value"])?;

    for tx in transactions {
        wtr.write_record([
            tx.run.symbol.as_str(),
            &format_date(tx.date, timeframe),
            tx.action.as_str(),
            &format!("{:.2}", tx.price),
            &tx.shares.map(|s| s.to_string()).unwrap_or_default(),
            &tx.value.map(|v| format!("{v:.2}")).unwrap_or_default(),
        ])?;
    }

    finish(wtr)
}

/// Closed round trips, ordered by trade sequence.
pub fn closed_positions_csv(trades: &[ClosedTrade], timeframe: Timeframe) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "TICKER",
        "BuyDate",
        "NumShares",
        "BuyPrice",
        "BuyValue",
        "SellDate",
        "SellPrice",
        "SellValue",
        "P/L",
        "P/L (%)",
    ])?;

    for t in trades {
        wtr.write_record([
            t.run.symbol.as_str(),
            &format_date(t.buy_date, timeframe),
            &t.shares.map(|s| s.to_string()).unwrap_or_default(),
            &format!("{:.2}", t.buy_price),
            &t.buy_value.map(|v| format!("{v:.2}")).unwrap_or_default(),
            &format_date(t.sell_date, timeframe),
            &format!("{:.2}", t.sell_price),
            &t.sell_value.map(|v| format!("{v:.2}")).unwrap_or_default(),
            &format!("{:.2}", t.pnl),
            &format!("{:.2}", t.pnl_pct),
        ])?;
    }

    finish(wtr)
}

/// Metric/value rows for the run's performance summary.
pub fn performance_csv(summary: &PerformanceSummary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["metric", "value"])?;

    match summary {
        PerformanceSummary::NoTrades { run } => {
            wtr.write_record(["run", &run.to_string()])?;
            wtr.write_record(["trade_count", "0"])?;
        }
        PerformanceSummary::Trades(r) => {
            let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();
            wtr.write_record(["run", &r.run.to_string()])?;
            wtr.write_record(["net_pnl", &format!("{:.2}", r.net_pnl)])?;
            wtr.write_record(["net_pnl_pct", &format!("{:.2}", r.net_pnl_pct)])?;
            wtr.write_record(["trade_count", &r.trade_count.to_string()])?;
            wtr.write_record(["winning_trades", &r.winning_trades.to_string()])?;
            wtr.write_record(["losing_trades", &r.losing_trades.to_string()])?;
            wtr.write_record(["win_rate", &format!("{:.4}", r.win_rate)])?;
            wtr.write_record(["largest_win", &opt(r.largest_win)])?;
            wtr.write_record(["largest_loss", &opt(r.largest_loss)])?;
            wtr.write_record(["avg_trade", &format!("{:.2}", r.avg_trade)])?;
            wtr.write_record(["avg_win", &opt(r.avg_win)])?;
            wtr.write_record(["avg_loss", &opt(r.avg_loss)])?;
            wtr.write_record(["avg_holding_bars", &format!("{:.1}", r.avg_holding_bars)])?;
            wtr.write_record(["longest_holding_bars", &r.longest_holding_bars.to_string()])?;
            wtr.write_record(["shortest_holding_bars", &r.shortest_holding_bars.to_string()])?;
            if let Some(bh) = r.buy_and_hold {
                wtr.write_record(["buy_and_hold_pnl", &format!("{:.2}", bh.pnl)])?;
                wtr.write_record(["buy_and_hold_pnl_pct", &format!("{:.2}", bh.pnl_pct)])?;
            }
        }
    }

    finish(wtr)
}

fn format_date(date: DateTime<Utc>, timeframe: Timeframe) -> String {
    if timeframe.bar_secs() >= Timeframe::Day1.bar_secs() {
        date.date_naive().to_string()
    } else {
        date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
