//! Normalized game history
//!
//! Downstream consumers match on the literal color labels produced here,
//! so the label set and field names are part of the output contract.

use crate::{Result, types::GameKind};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timestamp format used by the site API
pub const REMOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Timestamp format written to history records
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Crash points at or above this value are labelled green
pub const CRASH_GREEN_THRESHOLD: Decimal = Decimal::TWO;

/// Domain color labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// White, roulette code 0
    Branco,
    /// Red, roulette code 1
    Vermelho,
    /// Black, roulette code 2; crash points below the threshold
    Preto,
    /// Crash points at or above the threshold
    Verde,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branco => "branco",
            Self::Vermelho => "vermelho",
            Self::Preto => "preto",
            Self::Verde => "verde",
        }
    }

    /// Label for a remote roulette color code; anything but 0 and 1 is black
    pub fn from_roulette_code(code: u8) -> Self {
        match code {
            0 => Self::Branco,
            1 => Self::Vermelho,
            _ => Self::Preto,
        }
    }

    /// Label for a crash point
    pub fn from_crash_point(point: Decimal) -> Self {
        if point < CRASH_GREEN_THRESHOLD {
            Self::Preto
        } else {
            Self::Verde
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finished roulette round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouletteRecord {
    pub color: Color,
    pub value: u8,
    pub created_date: String,
}

/// One finished crash round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashRecord {
    pub color: Color,
    pub point: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

/// History entry for either game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryRecord {
    Roulette(RouletteRecord),
    Crash(CrashRecord),
}

/// Ordered records of one page, newest first as served
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<HistoryRecord>,
}

#[derive(Deserialize)]
struct RawRouletteGame {
    color: u8,
    roll: u8,
    created_at: String,
}

#[derive(Deserialize)]
struct RawCrashGame {
    crash_point: Decimal,
    #[serde(default)]
    created_at: Option<String>,
}

/// Re-render `YYYY-MM-DDTHH:MM:SS.ffffffZ` as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(raw: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(raw, REMOTE_TIMESTAMP_FORMAT)?;
    Ok(parsed.format(RECORD_TIMESTAMP_FORMAT).to_string())
}

/// Normalize one raw roulette game
pub fn roulette_record(raw: &Value) -> Result<RouletteRecord> {
    let game = RawRouletteGame::deserialize(raw)?;
    Ok(RouletteRecord {
        color: Color::from_roulette_code(game.color),
        value: game.roll,
        created_date: format_timestamp(&game.created_at)?,
    })
}

/// Normalize one raw crash game
pub fn crash_record(raw: &Value) -> Result<CrashRecord> {
    let game = RawCrashGame::deserialize(raw)?;
    let created_date = game
        .created_at
        .as_deref()
        .map(format_timestamp)
        .transpose()?;
    Ok(CrashRecord {
        color: Color::from_crash_point(game.crash_point),
        point: game.crash_point,
        created_date,
    })
}

/// Normalize a sequence of raw games in the order given
pub fn normalize(kind: GameKind, games: &[Value]) -> Result<Vec<HistoryRecord>> {
    games
        .iter()
        .map(|game| match kind {
            GameKind::Double => roulette_record(game).map(HistoryRecord::Roulette),
            GameKind::Crash => crash_record(game).map(HistoryRecord::Crash),
        })
        .collect()
}

/// Records array of a history payload: either a bare array or `{"records": [...]}`
pub fn page_records(payload: &Value) -> Result<&[Value]> {
    payload
        .as_array()
        .or_else(|| payload.get("records").and_then(Value::as_array))
        .map(Vec::as_slice)
        .ok_or_else(|| crate::Error::lookup("records"))
}
