//! Timeframe — bar granularity recognized by the price providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Bar granularity. The string forms match the provider interval names
/// (`1m`, `1d`, `1wk`, ...); serialization uses the same strings so config
/// files and fingerprints read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Min1,
    Min2,
    Min5,
    Min15,
    Min30,
    Min60,
    Min90,
    Hour1,
    Day1,
    Day5,
    Week1,
    Month1,
    Month3,
}

impl Timeframe {
    pub const ALL: [Timeframe; 13] = [
        Timeframe::Min1,
        Timeframe::Min2,
        Timeframe::Min5,
        Timeframe::Min15,
        Timeframe::Min30,
        Timeframe::Min60,
        Timeframe::Min90,
        Timeframe::Hour1,
        Timeframe::Day1,
        Timeframe::Day5,
        Timeframe::Week1,
        Timeframe::Month1,
        Timeframe::Month3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Min1 => "1m",
            Timeframe::Min2 => "2m",
            Timeframe::Min5 => "5m",
            Timeframe::Min15 => "15m",
            Timeframe::Min30 => "30m",
            Timeframe::Min60 => "60m",
            Timeframe::Min90 => "90m",
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1d",
            Timeframe::Day5 => "5d",
            Timeframe::Week1 => "1wk",
            Timeframe::Month1 => "1mo",
            Timeframe::Month3 => "3mo",
        }
    }

    /// Fixed bar duration in seconds, used to measure holding periods in
    /// whole bars. Months are approximated as 30 days.
    pub fn bar_secs(&self) -> i64 {
        match self {
            Timeframe::Min1 => 60,
            Timeframe::Min2 => 120,
            Timeframe::Min5 => 300,
            Timeframe::Min15 => 900,
            Timeframe::Min30 => 1_800,
            Timeframe::Min60 | Timeframe::Hour1 => 3_600,
            Timeframe::Min90 => 5_400,
            Timeframe::Day1 => 86_400,
            Timeframe::Day5 => 432_000,
            Timeframe::Week1 => 604_800,
            Timeframe::Month1 => 2_592_000,
            Timeframe::Month3 => 7_776_000,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .iter()
            .find(|tf| tf.as_str() == s.trim())
            .copied()
            .ok_or_else(|| ConfigError::UnknownTimeframe {
                value: s.to_string(),
            })
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
