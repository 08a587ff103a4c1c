//! Wager payloads and the uniform result envelope

use crate::types::serde_helpers::serialize_flexible_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message reported when the site answered the wager request
pub const SUCCESS_MESSAGE: &str = "Operação realizada com sucesso!!!";

/// Message reported when the wager request got no usable response
pub const FAILURE_MESSAGE: &str = "Erro, aposta não concluída!!!";

/// Currency every wager is placed in
pub const CURRENCY: &str = "BRL";

/// Map a roulette color label to the site's numeric encoding.
///
/// Total: `vermelho` → 1, `preto` → 2, anything else → 0 (white).
pub fn roulette_color_code(label: &str) -> u8 {
    match label {
        "vermelho" => 1,
        "preto" => 2,
        _ => 0,
    }
}

/// Uniform envelope for every wager call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagerResult {
    pub succeeded: bool,
    pub raw_response: Value,
    pub message: String,
}

impl WagerResult {
    /// Envelope for a response received from the site.
    ///
    /// `message` follows transport truthiness only; an error inside the
    /// body does not change it. Use [`WagerResult::remote_error`] for detail.
    pub fn from_response(truthy: bool, raw_response: Value) -> Self {
        Self {
            succeeded: truthy,
            raw_response,
            message: if truthy { SUCCESS_MESSAGE } else { FAILURE_MESSAGE }.to_string(),
        }
    }

    /// Envelope for a request that never got a response
    pub fn transport_failure() -> Self {
        Self::from_response(false, Value::Null)
    }

    /// The `error` object or string in the site's response body, if any
    pub fn remote_error(&self) -> Option<&Value> {
        self.raw_response.get("error").filter(|error| !error.is_null())
    }
}

/// Body of `POST /api/roulette_bets`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouletteBetPayload {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency_type: &'static str,
    pub color: u8,
    pub free_bet: bool,
    #[serde(serialize_with = "serialize_flexible_id")]
    pub wallet_id: String,
}

/// Body of `POST /api/crash/round/enter`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrashBetPayload {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub currency_type: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub auto_cashout_at: Decimal,
    #[serde(serialize_with = "serialize_flexible_id")]
    pub wallet_id: String,
}
