//! Serializable backtest configuration (TOML).
//!
//! A config file carries one `[backtest]` table and one `[strategy]` table:
//!
//! ```toml
//! [backtest]
//! symbol = "SPY"
//! start = "2020-01-02"
//! end = "2024-12-31"
//! timeframe = "1d"
//! capital = 10000.0
//! fee = 1.5
//!
//! [strategy]
//! kind = "sma"
//! window = 9
//! sizing = 0.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerlab_core::domain::Timeframe;
use ledgerlab_core::indicators::MaKind;
use ledgerlab_core::strategy::{CloseMarket, MaCrossover, SmaSignal, Strategy};

use crate::runner::BacktestParams;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("strategy '{kind}': {reason}")]
    Strategy { kind: String, reason: String },
}

/// Serializable configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub symbol: String,
    /// ISO calendar date, inclusive.
    pub start: String,
    /// ISO calendar date, inclusive.
    pub end: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    #[serde(default = "default_capital")]
    pub capital: f64,
    #[serde(default)]
    pub fee: f64,
    /// Overrides the strategy's own sizing when set.
    #[serde(default)]
    pub position_sizing: Option<f64>,
    #[serde(default = "default_true")]
    pub include_buy_and_hold: bool,
    #[serde(default = "default_true")]
    pub fee_on_forced_close: bool,
}

/// Strategy selection (tagged by `kind`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySection {
    CloseMarket {
        #[serde(default = "default_sizing")]
        sizing: f64,
    },
    Sma {
        window: usize,
        #[serde(default = "default_sizing")]
        sizing: f64,
    },
    MaCrossover {
        fast: usize,
        slow: usize,
        #[serde(default = "default_ma_kind")]
        ma: MaKind,
    },
}

fn default_timeframe() -> Timeframe {
    Timeframe::Day1
}

fn default_capital() -> f64 {
    10_000.0
}

fn default_sizing() -> f64 {
    1.0
}

fn default_ma_kind() -> MaKind {
    MaKind::Simple
}

fn default_true() -> bool {
    true
}

impl BacktestConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(toml)?)
    }

    /// Instantiate the configured strategy.
    pub fn build_strategy(&self) -> Result<Strategy, ConfigFileError> {
        match &self.strategy {
            StrategySection::CloseMarket { sizing } => {
                Ok(Strategy::Stepwise(Box::new(CloseMarket::new(*sizing))))
            }
            StrategySection::Sma { window, sizing } => {
                if *window == 0 {
                    return Err(ConfigFileError::Strategy {
                        kind: "sma".to_string(),
                        reason: "window must be at least 1".to_string(),
                    });
                }
                Ok(Strategy::Stepwise(Box::new(SmaSignal::new(*window, *sizing))))
            }
            StrategySection::MaCrossover { fast, slow, ma } => {
                if *fast == 0 || *slow == 0 || fast >= slow {
                    return Err(ConfigFileError::Strategy {
                        kind: "ma_crossover".to_string(),
                        reason: format!("need 0 < fast < slow, got fast={fast} slow={slow}"),
                    });
                }
                Ok(Strategy::Vector(Box::new(MaCrossover::new(*fast, *slow, *ma))))
            }
        }
    }

    /// Map the `[backtest]` table onto runner parameters.
    pub fn to_params(&self) -> BacktestParams {
        let b = &self.backtest;
        BacktestParams {
            symbol_or_file: b.symbol.clone(),
            start: b.start.clone(),
            end: b.end.clone(),
            timeframe: b.timeframe,
            capital: b.capital,
            fee: b.fee,
            position_sizing: b.position_sizing,
            include_buy_and_hold: b.include_buy_and_hold,
            fee_on_forced_close: b.fee_on_forced_close,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [backtest]
        symbol = "SPY"
        start = "2020-01-02"
        end = "2024-12-31"

        [strategy]
        kind = "sma"
        window = 9
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.backtest.timeframe, Timeframe::Day1);
        assert_eq!(config.backtest.capital, 10_000.0);
        assert_eq!(config.backtest.fee, 0.0);
        assert!(config.backtest.include_buy_and_hold);
        assert!(config.backtest.fee_on_forced_close);

        let params = config.to_params();
        assert_eq!(params.symbol_or_file, "SPY");
        assert_eq!(params.position_sizing, None);
    }

    #[test]
    fn strategy_factory_builds_each_kind() {
        let config = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.build_strategy().unwrap().describe(), "Sma(9)");

        let crossover = r#"
            [backtest]
            symbol = "SPY"
            start = "2020-01-02"
            end = "2024-12-31"

            [strategy]
            kind = "ma_crossover"
            fast = 9
            slow = 21
            ma = "exponential"
        "#;
        let config = BacktestConfig::from_toml(crossover).unwrap();
        let strategy = config.build_strategy().unwrap();
        assert_eq!(strategy.describe(), "MaCrossover(9/21 exponential)");
    }

    #[test]
    fn inverted_crossover_windows_are_rejected() {
        let bad = r#"
            [backtest]
            symbol = "SPY"
            start = "2020-01-02"
            end = "2024-12-31"

            [strategy]
            kind = "ma_crossover"
            fast = 21
            slow = 9
        "#;
        let config = BacktestConfig::from_toml(bad).unwrap();
        assert!(matches!(
            config.build_strategy(),
            Err(ConfigFileError::Strategy { .. })
        ));
    }

    #[test]
    fn unknown_strategy_kind_fails_to_parse() {
        let bad = r#"
            [backtest]
            symbol = "SPY"
            start = "2020-01-02"
            end = "2024-12-31"

            [strategy]
            kind = "astrology"
        "#;
        assert!(BacktestConfig::from_toml(bad).is_err());
    }

    #[test]
    fn timeframe_round_trips_through_toml() {
        let intraday = r#"
            [backtest]
            symbol = "SPY"
            start = "2024-01-02"
            end = "2024-02-02"
            timeframe = "15m"

            [strategy]
            kind = "close_market"
        "#;
        let config = BacktestConfig::from_toml(intraday).unwrap();
        assert_eq!(config.backtest.timeframe, Timeframe::Min15);
    }
}
