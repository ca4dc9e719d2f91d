//! Backtest runner — wires together data, simulation, and metrics.
//!
//! Two entry points:
//! - `backtest()`: one strategy, one parameter set. Used by the CLI.
//! - `backtest_many()`: independent parameter sets in parallel against a
//!   shared ledger. Each job is its own run; the ledger's natural-key
//!   deduplication keeps them from stepping on each other.

use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use ledgerlab_core::data::{DataError, PriceProvider};
use ledgerlab_core::domain::{ClosedTrade, PriceBar, RunId, Timeframe, Transaction};
use ledgerlab_core::error::{ConfigError, SimError};
use ledgerlab_core::sim::{SimConfig, Simulation};
use ledgerlab_core::strategy::Strategy;
use ledgerlab_core::TransactionLedger;

use crate::metrics::{summarize, PerformanceSummary};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}

/// Parameters for a single backtest run.
#[derive(Debug, Clone)]
pub struct BacktestParams {
    /// Ticker symbol, or a path to a `.txt` file whose first line is one.
    pub symbol_or_file: String,
    /// ISO calendar date, inclusive.
    pub start: String,
    /// ISO calendar date, inclusive.
    pub end: String,
    pub timeframe: Timeframe,
    pub capital: f64,
    pub fee: f64,
    /// Overrides the strategy's own sizing when set.
    pub position_sizing: Option<f64>,
    pub include_buy_and_hold: bool,
    pub fee_on_forced_close: bool,
    /// Narrate each transaction at info level.
    pub verbose: bool,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            symbol_or_file: String::new(),
            start: String::new(),
            end: String::new(),
            timeframe: Timeframe::Day1,
            capital: 10_000.0,
            fee: 0.0,
            position_sizing: None,
            include_buy_and_hold: true,
            fee_on_forced_close: true,
            verbose: false,
        }
    }
}

/// Everything a single backtest produced.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub run: RunId,
    pub bars: Vec<PriceBar>,
    pub transactions: Vec<Transaction>,
    pub closed_trades: Vec<ClosedTrade>,
    pub summary: PerformanceSummary,
}

/// Run one backtest end to end: resolve the ticker, validate the dates,
/// fetch bars, simulate, and aggregate.
///
/// An empty fetch result surfaces as `DataError::NoData` before the ledger
/// is touched.
pub fn backtest(
    strategy: &Strategy,
    provider: &dyn PriceProvider,
    ledger: &TransactionLedger,
    params: &BacktestParams,
) -> Result<BacktestOutcome, RunError> {
    let symbol = resolve_ticker(&params.symbol_or_file)?;
    let (start, end) = parse_date_range(&params.start, &params.end)?;

    let bars = provider.fetch(&symbol, params.timeframe, start, end)?;
    debug!("{symbol}: {} bars from {}", bars.len(), provider.name());

    let run = RunId::new(&strategy.describe(), &symbol, params.timeframe, start, end);
    let config = SimConfig {
        capital: params.capital,
        fee: params.fee,
        position_sizing: params.position_sizing,
        fee_on_forced_close: params.fee_on_forced_close,
        narrate: params.verbose,
    };
    let sim = Simulation::new(config, ledger)?;
    let closed_trades = sim.run(&run, strategy, &bars)?;
    info!("{run}: {} closed trades", closed_trades.len());

    let bars_ref = params.include_buy_and_hold.then_some(bars.as_slice());
    let summary = summarize(&run, &closed_trades, bars_ref, params.capital);
    let transactions = ledger.for_run(&run);

    Ok(BacktestOutcome {
        run,
        bars,
        transactions,
        closed_trades,
        summary,
    })
}

/// Run independent jobs in parallel against one shared ledger.
///
/// Results preserve job order. A job failure does not abort its siblings.
pub fn backtest_many(
    jobs: &[(Strategy, BacktestParams)],
    provider: &(dyn PriceProvider),
    ledger: &TransactionLedger,
) -> Vec<Result<BacktestOutcome, RunError>> {
    jobs.par_iter()
        .map(|(strategy, params)| backtest(strategy, provider, ledger, params))
        .collect()
}

/// Resolve a ticker argument: a literal symbol, or a `.txt` file whose first
/// non-empty line is one. Either way the result is uppercased.
pub fn resolve_ticker(symbol_or_file: &str) -> Result<String, DataError> {
    if !symbol_or_file.ends_with(".txt") {
        return Ok(symbol_or_file.trim().to_uppercase());
    }

    let path = Path::new(symbol_or_file);
    let contents = std::fs::read_to_string(path).map_err(|e| DataError::TickerFile {
        path: symbol_or_file.to_string(),
        reason: e.to_string(),
    })?;
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_uppercase)
        .ok_or_else(|| DataError::TickerFile {
            path: symbol_or_file.to_string(),
            reason: "file contains no ticker".to_string(),
        })
}

fn parse_date_range(
    start: &str,
    end: &str,
) -> Result<(chrono::NaiveDate, chrono::NaiveDate), ConfigError> {
    let parse = |value: &str| {
        value
            .parse::<chrono::NaiveDate>()
            .map_err(|_| ConfigError::InvalidDate {
                value: value.to_string(),
            })
    };
    let start = parse(start)?;
    let end = parse(end)?;
    if start >= end {
        return Err(ConfigError::InvalidDateRange { start, end });
    }
    Ok((start, end))
}
