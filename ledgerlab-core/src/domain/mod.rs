//! Domain types: bars, timeframes, run identities, transactions, positions,
//! and closed trades.

pub mod bar;
pub mod position;
pub mod run;
pub mod timeframe;
pub mod trade;
pub mod transaction;

pub use bar::{is_sorted_unique, normalize_series, PriceBar};
pub use position::{Position, PositionState};
pub use run::RunId;
pub use timeframe::Timeframe;
pub use trade::ClosedTrade;
pub use transaction::{Action, Transaction};
