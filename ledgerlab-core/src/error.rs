//! Structured error types for configuration, reporting, and the simulation.
//!
//! Every variant carries the offending value so user-facing messages can show
//! exactly what was rejected. Data-layer errors live in [`crate::data`].

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::RunId;

/// Rejected inputs — raised before any simulation step runs, never partially
/// applied.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("unknown timeframe '{value}' (expected one of 1m,2m,5m,15m,30m,60m,90m,1h,1d,5d,1wk,1mo,3mo)")]
    UnknownTimeframe { value: String },

    #[error("'{value}' is not a valid ISO date (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("start date {start} is not before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("capital cannot be negative (got {value})")]
    NegativeCapital { value: f64 },

    #[error("fee cannot be negative (got {value})")]
    NegativeFee { value: f64 },

    #[error("position sizing fraction must be in (0, 1] (got {value})")]
    PositionSizingOutOfRange { value: f64 },

    #[error("price series is empty")]
    EmptySeries,

    #[error("price series is not sorted ascending with unique dates (violation at {date})")]
    UnsortedSeries { date: DateTime<Utc> },

    #[error("price bar at {date} has non-finite or inconsistent OHLC values")]
    InsaneBar { date: DateTime<Utc> },

    #[error("malformed strategy: {reason}")]
    MalformedStrategy { reason: String },
}

/// Reporting-layer errors. These never abort the simulation loop itself —
/// they are raised by the resolver and downstream consumers.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("no transactions recorded for run {run}")]
    NoTransactions { run: RunId },

    #[error("trade {trade_seq} of run {run} has no matching pair — ledger is corrupt")]
    IncompleteTrade { run: RunId, trade_seq: u32 },
}

/// Errors from a full simulation run.
#[derive(Debug, Clone, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] ReportError),
}
