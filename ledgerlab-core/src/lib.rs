//! LedgerLab Core — the trade-signal-to-ledger simulation engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (price bars, timeframes, run identities, transactions,
//!   positions, closed trades)
//! - The append-only deduplicating transaction ledger
//! - The closed-position resolver (Buy/Sell pairing)
//! - The bar-by-bar simulation orchestrator with capital accounting and
//!   forced end-of-series liquidation
//! - Stepwise and vectorized strategy traits plus bundled strategies
//! - Moving-average indicator utilities
//! - Price providers (Yahoo Finance chart API, synthetic random walk)

pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod resolve;
pub mod sim;
pub mod strategy;

pub use error::{ConfigError, ReportError, SimError};
pub use ledger::TransactionLedger;
