//! Account-side payloads: authentication outcome, wallet, user summary

use crate::types::serde_helpers::deserialize_flexible_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of an authentication attempt
///
/// A rejected login is not an error: the site's error payload is handed
/// back unchanged so the caller can inspect it.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// A caller-supplied bearer token was adopted without contacting the site
    Adopted,
    /// The site issued a bearer token
    LoggedIn { payload: Value },
    /// The site answered with an error payload
    Rejected { payload: Value },
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    /// Raw payload returned by the site, if any
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Adopted => None,
            Self::LoggedIn { payload } | Self::Rejected { payload } => Some(payload),
        }
    }
}

/// First wallet of the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub currency_type: Option<String>,
}

/// Flat view over profile and wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub balance: Decimal,
    pub wallet_id: String,
    pub tax_id: Option<String>,
}

/// Whether a site payload carries a truthy `error` field
pub fn has_error(payload: &Value) -> bool {
    match payload.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
