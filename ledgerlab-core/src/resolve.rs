//! Pair Buy/Sell transactions into closed round trips.
//!
//! Transactions carry a `trade_seq` assigned by the orchestrator, so pairing
//! is a grouping problem rather than a matching problem: each sequence number
//! must contribute exactly one Buy and one Sell. Anything else means the run
//! produced a corrupt ledger and resolution refuses to report on it.

use std::collections::BTreeMap;

use crate::domain::{Action, ClosedTrade, RunId, Transaction};
use crate::error::ReportError;

/// Resolve one run's transactions into closed trades, ordered by `trade_seq`.
///
/// Per-trade P/L follows the transaction's sizing: capital-sized rows (with
/// recorded values) report fee-inclusive value deltas and percentage of the
/// buy value; price-only rows report the raw price delta and percentage of
/// the buy price.
pub fn closed_trades(run: &RunId, rows: &[Transaction]) -> Result<Vec<ClosedTrade>, ReportError> {
    let mine: Vec<&Transaction> = rows.iter().filter(|tx| &tx.run == run).collect();
    if mine.is_empty() {
        return Err(ReportError::NoTransactions { run: run.clone() });
    }

    let mut legs: BTreeMap<u32, (Option<&Transaction>, Option<&Transaction>)> = BTreeMap::new();
    for &tx in &mine {
        let entry = legs.entry(tx.trade_seq).or_default();
        let slot = match tx.action {
            Action::Buy => &mut entry.0,
            Action::Sell => &mut entry.1,
        };
        if slot.is_some() {
            // Two legs of the same side under one sequence number.
            return Err(ReportError::IncompleteTrade {
                run: run.clone(),
                trade_seq: tx.trade_seq,
            });
        }
        *slot = Some(tx);
    }

    let mut trades = Vec::with_capacity(legs.len());
    for (seq, pair) in legs {
        let (buy, sell) = match pair {
            (Some(b), Some(s)) => (b, s),
            _ => {
                return Err(ReportError::IncompleteTrade {
                    run: run.clone(),
                    trade_seq: seq,
                })
            }
        };

        let (pnl, pnl_pct) = match (buy.value, sell.value) {
            (Some(bv), Some(sv)) if bv != 0.0 => (sv - bv, (sv - bv) / bv * 100.0),
            (Some(bv), Some(sv)) => (sv - bv, 0.0),
            _ => {
                let delta = sell.price - buy.price;
                (delta, delta / buy.price * 100.0)
            }
        };

        trades.push(ClosedTrade {
            run: run.clone(),
            trade_seq: seq,
            buy_date: buy.date,
            buy_price: buy.price,
            buy_value: buy.value,
            sell_date: sell.date,
            sell_price: sell.price,
            sell_value: sell.value,
            shares: buy.shares,
            pnl,
            pnl_pct,
        });
    }
    Ok(trades)
}
