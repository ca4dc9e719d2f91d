//! Transaction — one persisted Buy or Sell row in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RunId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
        }
    }
}

/// One row in the transaction ledger.
///
/// `shares` and `value` are present for capital-sized strategies and absent
/// for price-only strategies that track unit returns. `value` includes the
/// flat fee: shares×price+fee on a buy, shares×price−fee on a sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub run: RunId,
    pub trade_seq: u32,
    pub action: Action,
    pub price: f64,
    pub date: DateTime<Utc>,
    pub shares: Option<u64>,
    pub value: Option<f64>,
}

impl Transaction {
    pub fn buy(
        run: RunId,
        trade_seq: u32,
        price: f64,
        date: DateTime<Utc>,
        shares: Option<u64>,
        value: Option<f64>,
    ) -> Self {
        Self {
            run,
            trade_seq,
            action: Action::Buy,
            price,
            date,
            shares,
            value,
        }
    }

    pub fn sell(
        run: RunId,
        trade_seq: u32,
        price: f64,
        date: DateTime<Utc>,
        shares: Option<u64>,
        value: Option<f64>,
    ) -> Self {
        Self {
            run,
            trade_seq,
            action: Action::Sell,
            price,
            date,
            shares,
            value,
        }
    }

    /// Natural key. A second event with the same key on the same date is a
    /// duplicate and is discarded by the ledger.
    pub fn natural_key(&self) -> (RunId, DateTime<Utc>, Action) {
        (self.run.clone(), self.date, self.action)
    }
}
