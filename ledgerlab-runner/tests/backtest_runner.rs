//! End-to-end runner tests against an in-memory provider.

use chrono::{Duration, NaiveDate};

use ledgerlab_core::data::{DataError, PriceProvider};
use ledgerlab_core::domain::{PriceBar, Timeframe};
use ledgerlab_core::strategy::{CloseMarket, Strategy};
use ledgerlab_core::TransactionLedger;
use ledgerlab_runner::{backtest, backtest_many, export_outcome, BacktestParams, PerformanceSummary, RunError};

/// Provider that serves a fixed close-price ramp for any symbol.
struct RampProvider {
    closes: Vec<f64>,
}

impl RampProvider {
    fn new(closes: &[f64]) -> Self {
        Self {
            closes: closes.to_vec(),
        }
    }
}

impl PriceProvider for RampProvider {
    fn name(&self) -> &str {
        "ramp"
    }

    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        if self.closes.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
                start,
                end,
            });
        }
        Ok(self
            .closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: (start + Duration::days(i as i64))
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    .and_utc(),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
            })
            .collect())
    }
}

fn params(symbol: &str) -> BacktestParams {
    BacktestParams {
        symbol_or_file: symbol.to_string(),
        start: "2024-01-02".to_string(),
        end: "2024-06-28".to_string(),
        capital: 1000.0,
        position_sizing: Some(0.3),
        ..BacktestParams::default()
    }
}

#[test]
fn backtest_end_to_end() {
    let provider = RampProvider::new(&[100.0, 110.0]);
    let ledger = TransactionLedger::new();
    let strategy = Strategy::Stepwise(Box::new(CloseMarket::default()));

    let outcome = backtest(&strategy, &provider, &ledger, &params("spy")).unwrap();

    assert_eq!(outcome.run.symbol, "SPY");
    assert_eq!(outcome.transactions.len(), 2);
    assert_eq!(outcome.closed_trades.len(), 1);
    let report = outcome.summary.report().unwrap();
    assert!((report.net_pnl - 30.0).abs() < 1e-9);
    assert!((report.net_pnl_pct - 3.0).abs() < 1e-9);
    assert_eq!(report.trade_count, 1);

    // Buy-and-hold baseline over the same two bars: 100 -> 110, 10%.
    let baseline = report.buy_and_hold.unwrap();
    assert!((baseline.pnl_pct - 10.0).abs() < 1e-9);
}

#[test]
fn empty_fetch_leaves_the_ledger_untouched() {
    let provider = RampProvider::new(&[]);
    let ledger = TransactionLedger::new();
    let strategy = Strategy::Stepwise(Box::new(CloseMarket::default()));

    let err = backtest(&strategy, &provider, &ledger, &params("SPY")).unwrap_err();
    assert!(matches!(err, RunError::Data(DataError::NoData { .. })));
    assert!(ledger.is_empty());
}

#[test]
fn bad_dates_fail_before_any_fetch() {
    let provider = RampProvider::new(&[100.0]);
    let ledger = TransactionLedger::new();
    let strategy = Strategy::Stepwise(Box::new(CloseMarket::default()));

    let mut p = params("SPY");
    p.start = "2024-06-28".to_string();
    p.end = "2024-01-02".to_string();
    let err = backtest(&strategy, &provider, &ledger, &p).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}

#[test]
fn quiet_run_summarizes_as_no_trades() {
    // Capital too small for even one share, so the strategy never enters.
    let provider = RampProvider::new(&[100.0, 101.0]);
    let ledger = TransactionLedger::new();
    let strategy = Strategy::Stepwise(Box::new(CloseMarket::default()));

    let mut p = params("SPY");
    p.capital = 10.0; // floor(0.3 * 10 / 100) = 0 shares
    let outcome = backtest(&strategy, &provider, &ledger, &p).unwrap();
    assert!(matches!(outcome.summary, PerformanceSummary::NoTrades { .. }));
    assert!(outcome.transactions.is_empty());
}

#[test]
fn parallel_jobs_share_one_ledger() {
    let provider = RampProvider::new(&[100.0, 110.0, 105.0, 115.0]);
    let ledger = TransactionLedger::new();

    let jobs: Vec<_> = ["SPY", "QQQ", "IWM"]
        .into_iter()
        .map(|symbol| {
            (
                Strategy::Stepwise(Box::new(CloseMarket::default())),
                params(symbol),
            )
        })
        .collect();

    let results = backtest_many(&jobs, &provider, &ledger);

    assert_eq!(results.len(), 3);
    for result in &results {
        let outcome = result.as_ref().unwrap();
        assert_eq!(outcome.transactions.len(), 4);
        assert_eq!(outcome.closed_trades.len(), 2);
    }
    // 3 runs x 4 transactions, all under distinct run keys.
    assert_eq!(ledger.len(), 12);
}

#[test]
fn export_round_trip_through_the_runner() {
    let provider = RampProvider::new(&[100.0, 110.0]);
    let ledger = TransactionLedger::new();
    let strategy = Strategy::Stepwise(Box::new(CloseMarket::default()));
    let outcome = backtest(&strategy, &provider, &ledger, &params("SPY")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let paths = export_outcome(dir.path(), &outcome).unwrap();

    let tape = std::fs::read_to_string(&paths.transactions).unwrap();
    assert!(tape.starts_with("TICKER,Date,Action,Price,NumShares,Value"));
    assert!(tape.contains("SPY,2024-01-02,Buy,100.00,3,300.00"));

    let perf = std::fs::read_to_string(&paths.performance).unwrap();
    assert!(perf.contains("net_pnl,30.00"));
}
