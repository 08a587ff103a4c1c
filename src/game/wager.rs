//! Wager submission
//!
//! Every call returns the same [`WagerResult`] envelope. Unlike the wallet
//! fetch, wager calls are not retried after a 502: a retried bet could be
//! placed twice.

use crate::{
    Result,
    session::SessionManager,
    transport::{HttpRequest, Transport},
    types::{
        GameKind, WagerResult,
        wager::{CURRENCY, CrashBetPayload, RouletteBetPayload, roulette_color_code},
    },
};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

/// Auto cash-out multiplier used when none is given
pub const DEFAULT_AUTO_CASHOUT: Decimal = Decimal::TWO;

/// Places and cashes out wagers with the active session
#[derive(Debug, Clone)]
pub struct WagerClient {
    session: Arc<SessionManager>,
    transport: Arc<dyn Transport>,
}

impl WagerClient {
    pub fn new(session: Arc<SessionManager>) -> Self {
        let transport = session.transport();
        Self { session, transport }
    }

    /// Bet on a roulette color label (`vermelho`, `preto`, anything else is white)
    pub async fn place_roulette_bet(&self, color: &str, amount: Decimal) -> Result<WagerResult> {
        let (bearer, wallet_id) = self.wallet_credentials().await?;
        let payload = RouletteBetPayload {
            amount,
            currency_type: CURRENCY,
            color: roulette_color_code(color),
            free_bet: false,
            wallet_id,
        };
        tracing::info!("Placing roulette bet of {} on {} ({})", amount, color, payload.color);

        let request = self
            .request("/api/roulette_bets", GameKind::Double, &bearer)
            .with_json(&payload)?;
        Ok(self.submit(request).await)
    }

    /// Enter the current crash round with an auto cash-out point
    pub async fn place_crash_bet(
        &self,
        amount: Decimal,
        auto_cashout_at: Option<Decimal>,
    ) -> Result<WagerResult> {
        let (bearer, wallet_id) = self.wallet_credentials().await?;
        let payload = CrashBetPayload {
            amount,
            currency_type: CURRENCY,
            auto_cashout_at: auto_cashout_at.unwrap_or(DEFAULT_AUTO_CASHOUT),
            wallet_id,
        };
        tracing::info!(
            "Entering crash round with {} (auto cash-out {})",
            amount,
            payload.auto_cashout_at
        );

        let request = self
            .request("/api/crash/round/enter", GameKind::Crash, &bearer)
            .with_json(&payload)?;
        Ok(self.submit(request).await)
    }

    /// Cash out of the current crash round
    pub async fn cashout_crash(&self) -> Result<WagerResult> {
        let bearer = self
            .session
            .snapshot()
            .await
            .bearer_token
            .ok_or_else(|| crate::Error::session("no bearer token, authenticate first"))?;

        tracing::info!("Cashing out of crash round");
        let request = self
            .request("/api/crash/round/cashout", GameKind::Crash, &bearer)
            .with_json(&json!({}))?;
        Ok(self.submit(request).await)
    }

    fn request(&self, path: &str, kind: GameKind, bearer: &str) -> HttpRequest {
        let settings = self.session.settings();
        HttpRequest::post(format!("{}{}", settings.site_base(), path))
            .with_referer(settings.referer(kind.referer_page()))
            .with_bearer(bearer)
    }

    async fn wallet_credentials(&self) -> Result<(String, String)> {
        let session = self.session.snapshot().await;
        let bearer = session
            .bearer_token
            .ok_or_else(|| crate::Error::session("no bearer token, authenticate first"))?;
        let wallet_id = session.wallet_id.ok_or(crate::Error::WalletUnavailable)?;
        Ok((bearer, wallet_id))
    }

    async fn submit(&self, request: HttpRequest) -> WagerResult {
        match self.transport.send(request).await {
            Ok(response) => {
                let result = WagerResult::from_response(response.is_truthy(), response.json_value());
                if let Some(error) = result.remote_error() {
                    tracing::warn!("Wager answered {} with error {}", response.status, error);
                }
                result
            }
            Err(e) => {
                tracing::warn!("Wager request failed: {}", e);
                WagerResult::transport_failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::session::{StaticTokenSource, VerificationTokenProvider};
    use crate::transport::{Method, testing::ScriptedTransport};
    use crate::types::wager::{FAILURE_MESSAGE, SUCCESS_MESSAGE};
    use rust_decimal_macros::dec;

    async fn client_with(transport: Arc<ScriptedTransport>, wallet: bool) -> WagerClient {
        if wallet {
            transport.on(Method::Get, "/api/wallets", 200, json!([{"id": 4512, "balance": "50"}]));
        }
        let verifier =
            VerificationTokenProvider::with_tiers(vec![Arc::new(StaticTokenSource::new("captcha"))]);
        let session = Arc::new(SessionManager::with_transport(
            Settings::default(),
            transport,
            verifier,
        ));
        session.authenticate(Some("jwt")).await.unwrap();
        if wallet {
            session.fetch_balance().await.unwrap();
        }
        WagerClient::new(session)
    }

    #[tokio::test]
    async fn test_roulette_bet_success_ignores_body_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(
            Method::Post,
            "/api/roulette_bets",
            200,
            json!({"error": {"message": "insufficient balance"}}),
        );
        let client = client_with(transport.clone(), true).await;

        let result = client.place_roulette_bet("vermelho", dec!(5.0)).await.unwrap();
        assert!(result.succeeded);
        assert_eq!(result.message, SUCCESS_MESSAGE);

        let request = transport
            .requests()
            .into_iter()
            .find(|r| r.url.ends_with("/api/roulette_bets"))
            .unwrap();
        assert_eq!(
            request.json,
            Some(json!({
                "amount": 5.0,
                "currency_type": "BRL",
                "color": 1,
                "free_bet": false,
                "wallet_id": 4512
            }))
        );
        assert_eq!(request.header("authorization"), Some("Bearer jwt"));
        assert_eq!(request.header("referer"), Some("https://blaze.com/pt/games/double"));
    }

    #[tokio::test]
    async fn test_rejected_status_reports_failure() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::Post, "/api/roulette_bets", 400, json!({"error": "closed"}));
        let client = client_with(transport, true).await;

        let result = client.place_roulette_bet("preto", dec!(1)).await.unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.message, FAILURE_MESSAGE);
        assert_eq!(result.raw_response, json!({"error": "closed"}));
    }

    #[tokio::test]
    async fn test_bad_gateway_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::Post, "/api/crash/round/enter", 502, json!("Bad Gateway"));
        let client = client_with(transport.clone(), true).await;

        let result = client.place_crash_bet(dec!(2), None).await.unwrap();
        assert!(!result.succeeded);
        assert_eq!(transport.count("/api/crash/round/enter"), 1);
        assert_eq!(transport.count("/api/auth/password"), 0);
    }

    #[tokio::test]
    async fn test_crash_bet_default_cashout() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::Post, "/api/crash/round/enter", 200, json!({"id": "bet-1"}));
        let client = client_with(transport.clone(), true).await;

        let result = client.place_crash_bet(dec!(3), None).await.unwrap();
        assert!(result.succeeded);

        let request = transport
            .requests()
            .into_iter()
            .find(|r| r.url.ends_with("/api/crash/round/enter"))
            .unwrap();
        let body = request.json.clone().unwrap();
        assert_eq!(body["auto_cashout_at"], json!(2.0));
        assert_eq!(body["type"], json!("BRL"));
        assert_eq!(request.header("referer"), Some("https://blaze.com/pt/games/crash"));
    }

    #[tokio::test]
    async fn test_cashout_sends_empty_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::Post, "/api/crash/round/cashout", 200, json!({"multiplier": 1.8}));
        let client = client_with(transport.clone(), false).await;

        let result = client.cashout_crash().await.unwrap();
        assert!(result.succeeded);
        assert_eq!(transport.requests()[0].json, Some(json!({})));
    }

    #[tokio::test]
    async fn test_transport_failure_envelope() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail(Method::Post, "/api/roulette_bets");
        let client = client_with(transport, true).await;

        let result = client.place_roulette_bet("branco", dec!(1)).await.unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.message, FAILURE_MESSAGE);
        assert!(result.raw_response.is_null());
    }

    #[tokio::test]
    async fn test_wallet_required() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with(transport.clone(), false).await;

        let err = client.place_roulette_bet("preto", dec!(1)).await.unwrap_err();
        assert!(matches!(err, crate::Error::WalletUnavailable));
        assert!(transport.requests().is_empty());
    }
}
