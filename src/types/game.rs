//! Game kinds and round state
//!
//! A round object is fetched repeatedly while it is in progress. It becomes
//! a terminal outcome only once the fields populated at the end of the
//! round are all present.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Game stream polled by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Roulette-style game ("double")
    Double,
    /// Crash-style game
    Crash,
}

impl GameKind {
    /// Name used by the companion server and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Crash => "crash",
        }
    }

    /// Path segment of the site API, as in `/api/{segment}_games/current`
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Double => "roulette",
            Self::Crash => "crash",
        }
    }

    /// Site page matching the game, used as referer
    pub fn referer_page(&self) -> &'static str {
        match self {
            Self::Double => "games/double",
            Self::Crash => "games/crash",
        }
    }

    /// Whether a fetched round object carries a terminal outcome
    pub fn is_terminal(&self, round: &Value) -> crate::Result<bool> {
        Ok(match self {
            Self::Double => RouletteRound::deserialize(round)?.is_final(),
            Self::Crash => CrashRound::deserialize(round)?.is_final(),
        })
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = crate::Error;

    fn from_str(raw: &str) -> crate::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "double" | "roulette" => Ok(Self::Double),
            "crash" => Ok(Self::Crash),
            other => Err(crate::Error::config(format!(
                "unknown game '{}', expected double|crash",
                other
            ))),
        }
    }
}

/// Roulette round as returned by the current/result endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouletteRound {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub color: Option<u8>,
    #[serde(default)]
    pub roll: Option<u8>,
}

impl RouletteRound {
    /// Final only when both color and roll are present
    pub fn is_final(&self) -> bool {
        self.color.is_some() && self.roll.is_some()
    }
}

/// Crash round as returned by the current/result endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrashRound {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub crash_point: Option<Decimal>,
}

impl CrashRound {
    /// Final only when the crash point is present
    pub fn is_final(&self) -> bool {
        self.crash_point.is_some()
    }
}

/// Terminal outcome of a roulette round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleOutcome {
    pub roll: u8,
    pub color: u8,
}

/// Terminal outcome of a crash round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashOutcome {
    pub point: Decimal,
}

/// Status string of a round object, `"unknown"` when absent
pub fn round_status(round: &Value) -> &str {
    round
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}
