//! Simulation orchestrator: drives a strategy over a bar series and records
//! the resulting transactions.
//!
//! One simulation services one run. The loop itself is single-threaded and
//! sequential; concurrency lives a level up, where independent runs share
//! the ledger. Two loops exist, chosen by the strategy's shape:
//!
//! - Stepwise strategies are asked per bar, sized from remaining capital,
//!   and their transactions carry share counts and fee-inclusive values.
//! - Vectorized strategies emit their signal columns once; their
//!   transactions are price-only.
//!
//! Either way, an open position at the end of the series is force-closed at
//! the final close so every recorded Buy has a Sell.

use log::info;

use crate::domain::{is_sorted_unique, ClosedTrade, Position, PositionState, PriceBar, RunId, Transaction};
use crate::error::{ConfigError, SimError};
use crate::ledger::TransactionLedger;
use crate::resolve;
use crate::strategy::{StepwiseStrategy, Strategy, VectorStrategy};

/// Simulation parameters. `position_sizing` overrides the strategy's own
/// sizing when set.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub capital: f64,
    pub fee: f64,
    pub position_sizing: Option<f64>,
    pub fee_on_forced_close: bool,
    pub narrate: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capital: 10_000.0,
            fee: 0.0,
            position_sizing: None,
            fee_on_forced_close: true,
            narrate: false,
        }
    }
}

pub struct Simulation<'a> {
    config: SimConfig,
    ledger: &'a TransactionLedger,
}

impl<'a> Simulation<'a> {
    /// Validate the config and bind the simulation to a ledger.
    pub fn new(config: SimConfig, ledger: &'a TransactionLedger) -> Result<Self, ConfigError> {
        if config.capital < 0.0 || !config.capital.is_finite() {
            return Err(ConfigError::NegativeCapital {
                value: config.capital,
            });
        }
        if config.fee < 0.0 || !config.fee.is_finite() {
            return Err(ConfigError::NegativeFee { value: config.fee });
        }
        if let Some(sizing) = config.position_sizing {
            check_sizing(sizing)?;
        }
        Ok(Self { config, ledger })
    }

    /// Run `strategy` over `bars`, appending transactions to the ledger, and
    /// return the run's closed trades. A strategy that never fires yields an
    /// empty vector, not an error.
    pub fn run(
        &self,
        run: &RunId,
        strategy: &Strategy,
        bars: &[PriceBar],
    ) -> Result<Vec<ClosedTrade>, SimError> {
        if bars.is_empty() {
            return Err(ConfigError::EmptySeries.into());
        }
        if let Some(bad) = first_disorder(bars) {
            return Err(ConfigError::UnsortedSeries { date: bad }.into());
        }
        if let Some(bad) = bars.iter().find(|b| !b.is_sane()) {
            return Err(ConfigError::InsaneBar { date: bad.date }.into());
        }

        match strategy {
            Strategy::Stepwise(s) => self.run_stepwise(run, s.as_ref(), bars)?,
            Strategy::Vector(s) => self.run_vector(run, s.as_ref(), bars),
        }

        match resolve::closed_trades(run, &self.ledger.snapshot()) {
            Ok(trades) => Ok(trades),
            Err(crate::error::ReportError::NoTransactions { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn run_stepwise(
        &self,
        run: &RunId,
        strategy: &dyn StepwiseStrategy,
        bars: &[PriceBar],
    ) -> Result<(), SimError> {
        let sizing = self
            .config
            .position_sizing
            .unwrap_or_else(|| strategy.position_sizing());
        check_sizing(sizing).map_err(SimError::from)?;

        let mut capital = self.config.capital;
        let mut state = PositionState::default();
        let mut trade_seq: u32 = 0;

        for i in 0..bars.len() {
            let window = &bars[..=i];
            match &state {
                PositionState::Flat => {
                    let Some(signal) = strategy.buy(window) else {
                        continue;
                    };
                    // A zero, negative, or non-finite price would mint
                    // shares from nothing.
                    if !price_is_valid(signal.price) {
                        continue;
                    }
                    let shares = (sizing * capital / signal.price).floor() as u64;
                    if shares == 0 {
                        continue;
                    }
                    let value = shares as f64 * signal.price + self.config.fee;
                    if value > capital {
                        // Fee pushed the order past available capital.
                        continue;
                    }
                    capital -= value;
                    if self.config.narrate {
                        info!(
                            "{run}: buy {shares} @ {:.2} on {} (cost {value:.2}, capital {capital:.2})",
                            signal.price,
                            signal.date.date_naive()
                        );
                    }
                    self.ledger.append(Transaction::buy(
                        run.clone(),
                        trade_seq,
                        signal.price,
                        signal.date,
                        Some(shares),
                        Some(value),
                    ));
                    state.open(Position {
                        run: run.clone(),
                        trade_seq,
                        buy_price: signal.price,
                        buy_date: signal.date,
                        shares: Some(shares),
                        entry_cost: Some(value),
                    });
                }
                PositionState::Open(pos) => {
                    let Some(signal) = strategy.sell(window) else {
                        continue;
                    };
                    if !price_is_valid(signal.price) {
                        continue;
                    }
                    let shares = pos.shares.unwrap_or(0);
                    let value = shares as f64 * signal.price - self.config.fee;
                    capital += value;
                    if self.config.narrate {
                        info!(
                            "{run}: sell {shares} @ {:.2} on {} (proceeds {value:.2}, capital {capital:.2})",
                            signal.price,
                            signal.date.date_naive()
                        );
                    }
                    self.ledger.append(Transaction::sell(
                        run.clone(),
                        trade_seq,
                        signal.price,
                        signal.date,
                        Some(shares),
                        Some(value),
                    ));
                    state.close();
                    trade_seq += 1;
                }
            }
        }

        if let Some(pos) = state.close() {
            let last = &bars[bars.len() - 1];
            let shares = pos.shares.unwrap_or(0);
            let fee = if self.config.fee_on_forced_close {
                self.config.fee
            } else {
                0.0
            };
            let value = shares as f64 * last.close - fee;
            if self.config.narrate {
                info!(
                    "{run}: forced close, sell {shares} @ {:.2} on {}",
                    last.close,
                    last.date.date_naive()
                );
            }
            self.ledger.append(Transaction::sell(
                run.clone(),
                pos.trade_seq,
                last.close,
                last.date,
                Some(shares),
                Some(value),
            ));
        }
        Ok(())
    }

    fn run_vector(&self, run: &RunId, strategy: &dyn VectorStrategy, bars: &[PriceBar]) {
        let signals = strategy.generate_signal(bars);
        let mut state = PositionState::default();
        let mut trade_seq: u32 = 0;

        for (i, bar) in bars.iter().enumerate() {
            match &state {
                PositionState::Flat => {
                    let Some(price) = signals.buy.get(i).copied().flatten() else {
                        continue;
                    };
                    if !price_is_valid(price) {
                        continue;
                    }
                    if self.config.narrate {
                        info!("{run}: buy signal @ {price:.2} on {}", bar.date.date_naive());
                    }
                    self.ledger.append(Transaction::buy(
                        run.clone(),
                        trade_seq,
                        price,
                        bar.date,
                        None,
                        None,
                    ));
                    state.open(Position {
                        run: run.clone(),
                        trade_seq,
                        buy_price: price,
                        buy_date: bar.date,
                        shares: None,
                        entry_cost: None,
                    });
                }
                PositionState::Open(_) => {
                    let Some(price) = signals.sell.get(i).copied().flatten() else {
                        continue;
                    };
                    if !price_is_valid(price) {
                        continue;
                    }
                    if self.config.narrate {
                        info!("{run}: sell signal @ {price:.2} on {}", bar.date.date_naive());
                    }
                    self.ledger.append(Transaction::sell(
                        run.clone(),
                        trade_seq,
                        price,
                        bar.date,
                        None,
                        None,
                    ));
                    state.close();
                    trade_seq += 1;
                }
            }
        }

        if let Some(pos) = state.close() {
            let last = &bars[bars.len() - 1];
            if self.config.narrate {
                info!(
                    "{run}: forced close @ {:.2} on {}",
                    last.close,
                    last.date.date_naive()
                );
            }
            self.ledger.append(Transaction::sell(
                run.clone(),
                pos.trade_seq,
                last.close,
                last.date,
                None,
                None,
            ));
        }
    }
}

/// Signal prices must be finite and positive; anything else is treated like
/// an insufficient-capital signal and skipped.
fn price_is_valid(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn check_sizing(sizing: f64) -> Result<(), ConfigError> {
    if !(sizing > 0.0 && sizing <= 1.0) {
        return Err(ConfigError::PositionSizingOutOfRange { value: sizing });
    }
    Ok(())
}

/// Date of the first bar that breaks strict chronological order, if any.
fn first_disorder(bars: &[PriceBar]) -> Option<chrono::DateTime<chrono::Utc>> {
    if is_sorted_unique(bars) {
        return None;
    }
    bars.windows(2)
        .find(|w| w[1].date <= w[0].date)
        .map(|w| w[1].date)
}
