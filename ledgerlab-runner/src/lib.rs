//! LedgerLab Runner — backtest orchestration, metrics, and export.
//!
//! This crate builds on `ledgerlab-core` to provide:
//! - Single-backtest runner: ticker resolution, date validation, data fetch,
//!   simulation, and performance aggregation
//! - Parallel execution of independent parameter sets against a shared ledger
//! - TOML configuration mapping onto runner parameters and strategy selection
//! - CSV artifact export (transaction tape, closed positions, performance)

pub mod config;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, ConfigFileError};
pub use export::{export_outcome, ExportPaths};
pub use metrics::{summarize, BuyAndHold, PerformanceReport, PerformanceSummary};
pub use runner::{backtest, backtest_many, BacktestOutcome, BacktestParams, RunError};
