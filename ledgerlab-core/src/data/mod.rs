//! Price series providers.
//!
//! The `PriceProvider` trait abstracts over where bars come from (Yahoo
//! Finance, synthetic generation, test doubles) so the rest of the crate
//! only ever sees normalized `PriceBar` series.

pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use provider::{DataError, PriceProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
