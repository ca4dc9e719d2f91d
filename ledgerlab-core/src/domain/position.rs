//! Position tracking — the single-position state machine.

use chrono::{DateTime, Utc};

use super::RunId;

/// A live position, owned by the orchestrator from the buy event until the
/// matching sell. At most one exists per run at any time (the strategies
/// modeled are single-position, no pyramiding).
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub run: RunId,
    pub trade_seq: u32,
    pub buy_price: f64,
    pub buy_date: DateTime<Utc>,
    /// Absent for price-only strategies.
    pub shares: Option<u64>,
    /// Entry cost including the fee. Absent for price-only strategies.
    pub entry_cost: Option<f64>,
}

/// The open/closed state machine: FLAT→OPEN on an accepted buy, OPEN→FLAT on
/// an accepted sell or forced liquidation. No other transitions exist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(Position),
}

impl PositionState {
    /// Accept a buy. Returns false (signal ignored) if a position is already
    /// open.
    pub fn open(&mut self, position: Position) -> bool {
        match self {
            PositionState::Flat => {
                *self = PositionState::Open(position);
                true
            }
            PositionState::Open(_) => false,
        }
    }

    /// Accept a sell, yielding the closed position. Returns None (signal
    /// ignored) while flat.
    pub fn close(&mut self) -> Option<Position> {
        match std::mem::take(self) {
            PositionState::Flat => None,
            PositionState::Open(position) => Some(position),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PositionState::Open(_))
    }

    pub fn as_open(&self) -> Option<&Position> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(position) => Some(position),
        }
    }
}
