//! TransactionLedger — append-only, deduplicating store of Buy/Sell rows.
//!
//! The ledger is the source of truth for all downstream metrics. It is owned
//! explicitly (constructed per scope, passed to each simulation) rather than
//! living in process-wide state, so independent runs and tests never
//! contaminate each other. A single mutex around append-and-deduplicate makes
//! it safe to share across concurrently executing runs; reads snapshot under
//! the same lock so a partial append is never observed.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::{Action, RunId, Transaction};

#[derive(Debug, Default)]
struct LedgerInner {
    rows: Vec<Transaction>,
    keys: HashSet<(RunId, DateTime<Utc>, Action)>,
}

/// Append-only transaction store, deduplicated on `(run, date, action)`.
///
/// Ordering within a run is insertion order, which is chronological because
/// the orchestrator appends in bar order. No cross-run ordering is
/// guaranteed.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    inner: Mutex<LedgerInner>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction. Returns false if a row with the same natural
    /// key already exists — the duplicate is silently discarded, not
    /// overwritten, which protects a replayed run from double-recording.
    pub fn append(&self, tx: Transaction) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.keys.insert(tx.natural_key()) {
            return false;
        }
        inner.rows.push(tx);
        true
    }

    /// Snapshot of every row, in insertion order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.inner.lock().unwrap().rows.clone()
    }

    /// Snapshot of the rows belonging to one run, in insertion order.
    pub fn for_run(&self, run: &RunId) -> Vec<Transaction> {
        self.inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|tx| &tx.run == run)
            .cloned()
            .collect()
    }

    /// Drop every row and reset deduplication state.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.rows.clear();
        inner.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
