//! # Session Management Module
//!
//! [`SessionManager`] owns the authentication state of one account: the
//! bearer token, the login flag and the wallet id. It is the only writer of
//! that state; the poller and the wager client read a [`Session`] snapshot
//! per call.
//!
//! ## State machine
//!
//! ```text
//! Unauthenticated --authenticate ok--> Authenticated
//! Authenticated --502 + refresh()--> Unauthenticated --login ok--> Authenticated
//! ```
//!
//! There is no logout. A refresh re-runs the full login flow and at most one
//! refresh is in flight at a time.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use blaze_client::{Settings, SessionManager};
//!
//! # tokio_test::block_on(async {
//! let manager = SessionManager::new(Settings::default())?
//!     .with_credentials("player@example.com", "secret");
//!
//! let outcome = manager.authenticate(None).await?;
//! if outcome.is_authenticated() {
//!     let summary = manager.fetch_user_summary().await?;
//!     println!("{} has {}", summary.username, summary.balance);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use crate::{
    Result,
    config::Settings,
    session::VerificationTokenProvider,
    transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport},
    types::{
        AuthOutcome, UserSummary, Wallet,
        account::has_error,
    },
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Authentication state of one account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub bearer_token: Option<String>,
    pub is_authenticated: bool,
    pub wallet_id: Option<String>,
}

/// Username/password pair sent to the password grant
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Owner of the authentication lifecycle
#[derive(Debug)]
pub struct SessionManager {
    /// Configuration settings
    settings: Arc<Settings>,
    /// Transport for site requests
    transport: Arc<dyn Transport>,
    /// Verification token chain used by the login flow
    verifier: VerificationTokenProvider,
    /// Login credentials, absent when only token adoption is used
    credentials: Option<Credentials>,
    /// Mutable session state
    state: RwLock<Session>,
    /// Verification token kept for one more login attempt
    reusable_verification: Mutex<Option<String>>,
    /// Serializes refreshes
    refresh_lock: Mutex<()>,
}

impl SessionManager {
    /// Creates a session manager talking to the site over reqwest.
    ///
    /// Credentials configured in the settings are picked up here.
    pub fn new(settings: Settings) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::from_settings(&settings)?);
        let verifier = VerificationTokenProvider::from_settings(&settings, transport.clone());
        Ok(Self::with_transport(settings, transport, verifier))
    }

    /// Creates a session manager over an explicit transport and token chain
    pub fn with_transport(
        settings: Settings,
        transport: Arc<dyn Transport>,
        verifier: VerificationTokenProvider,
    ) -> Self {
        let credentials = match (
            settings.credentials.username.clone(),
            settings.credentials.password.clone(),
        ) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Self {
            settings: Arc::new(settings),
            transport,
            verifier,
            credentials,
            state: RwLock::new(Session::default()),
            reusable_verification: Mutex::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Set the login credentials
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Settings the manager was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Transport shared with the other client components
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Read-only copy of the current state
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    /// Offer a pre-acquired verification token to the next login attempt
    pub async fn seed_verification_token(&self, token: impl Into<String>) {
        *self.reusable_verification.lock().await = Some(token.into());
    }

    /// Authenticate the session.
    ///
    /// With `existing_token` the token is adopted as-is and no request is
    /// made. Otherwise a full password-grant login runs; a rejection comes
    /// back as [`AuthOutcome::Rejected`] carrying the site's payload.
    pub async fn authenticate(&self, existing_token: Option<&str>) -> Result<AuthOutcome> {
        match existing_token {
            Some(token) => {
                let mut state = self.state.write().await;
                state.bearer_token = Some(token.to_string());
                state.is_authenticated = true;
                tracing::info!("Adopted existing bearer token");
                Ok(AuthOutcome::Adopted)
            }
            None => self.login().await,
        }
    }

    /// Re-run the full login flow.
    ///
    /// Called by the owner of a request that failed with 502. Concurrent
    /// callers queue behind the one in flight.
    pub async fn refresh(&self) -> Result<AuthOutcome> {
        let _guard = self.refresh_lock.lock().await;
        tracing::info!("Refreshing session");
        self.state.write().await.is_authenticated = false;
        self.login().await
    }

    /// Authenticated `GET /api/users/me`.
    ///
    /// A payload without an error confirms the session.
    pub async fn fetch_profile(&self) -> Result<Value> {
        let bearer = self.bearer().await?;
        let request = HttpRequest::get(format!("{}/api/users/me", self.settings.site_base()))
            .with_bearer(&bearer);
        let payload = self.transport.send(request).await?.json_value();

        if !has_error(&payload) {
            self.state.write().await.is_authenticated = true;
        }
        Ok(payload)
    }

    /// Authenticated `GET /api/wallets`, caching the first wallet's id.
    ///
    /// A 502 triggers one [`SessionManager::refresh`] and one retried fetch,
    /// never more. A payload that does not parse yields `Ok(None)`.
    pub async fn fetch_balance(&self) -> Result<Option<Wallet>> {
        let mut response = self.request_wallets().await?;
        if response.is_bad_gateway() {
            tracing::warn!("Wallet fetch answered 502, refreshing session and retrying once");
            self.refresh().await?;
            response = self.request_wallets().await?;
        }

        let wallet = match first_wallet(&response) {
            Ok(wallet) => wallet,
            Err(e) => {
                tracing::debug!("Unusable wallet payload (status {}): {}", response.status, e);
                return Ok(None);
            }
        };

        self.state.write().await.wallet_id = Some(wallet.id.clone());
        tracing::debug!("Wallet {} cached", wallet.id);
        Ok(Some(wallet))
    }

    /// Profile and wallet flattened into one summary.
    ///
    /// Fails with a lookup error when an expected field is missing.
    pub async fn fetch_user_summary(&self) -> Result<UserSummary> {
        let wallet = self.fetch_balance().await?;
        let profile = self.fetch_profile().await?;

        let username = profile
            .get("username")
            .and_then(Value::as_str)
            .ok_or_else(|| crate::Error::lookup("username"))?
            .to_string();
        let wallet = wallet.ok_or_else(|| crate::Error::lookup("balance"))?;
        let balance = wallet.balance.ok_or_else(|| crate::Error::lookup("balance"))?;
        let tax_id = match profile.get("tax_id") {
            None => return Err(crate::Error::lookup("tax_id")),
            Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Ok(UserSummary {
            username,
            balance,
            wallet_id: wallet.id,
            tax_id,
        })
    }

    async fn bearer(&self) -> Result<String> {
        self.state
            .read()
            .await
            .bearer_token
            .clone()
            .ok_or_else(|| crate::Error::session("no bearer token, authenticate first"))
    }

    async fn request_wallets(&self) -> Result<HttpResponse> {
        let bearer = self.bearer().await?;
        let request = HttpRequest::get(format!("{}/api/wallets", self.settings.site_base()))
            .with_referer(self.settings.referer("games/double"))
            .with_bearer(&bearer);
        self.transport.send(request).await
    }

    /// Password-grant login
    async fn login(&self) -> Result<AuthOutcome> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| crate::Error::missing_credentials("username and password are required to log in"))?;

        let verification = self.verification_token().await?;
        let request = HttpRequest::put(format!("{}/api/auth/password", self.settings.site_base()))
            .with_query("analyticSessionID", Utc::now().timestamp_millis())
            .with_header("x-captcha-response", verification)
            .with_referer(self.settings.referer("?modal=auth&tab=login"))
            .with_json(credentials)?;

        tracing::info!("Logging in as {}", credentials.username);
        let response = self.transport.send(request).await?;
        let payload = response.json_value();

        let access_token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty());

        match access_token {
            Some(token) if !has_error(&payload) => {
                {
                    let mut state = self.state.write().await;
                    state.bearer_token = Some(token.to_string());
                    state.is_authenticated = true;
                }
                self.reusable_verification.lock().await.take();
                tracing::info!("Login succeeded");
                Ok(AuthOutcome::LoggedIn { payload })
            }
            _ => {
                tracing::warn!("Login rejected (status {})", response.status);
                Ok(AuthOutcome::Rejected { payload })
            }
        }
    }

    /// Token for this attempt: the kept one if any, else a fresh one that is
    /// kept for exactly one more attempt
    async fn verification_token(&self) -> Result<String> {
        if let Some(token) = self.reusable_verification.lock().await.take() {
            tracing::debug!("Reusing verification token");
            return Ok(token);
        }

        let target_url = format!("{}/api/auth/password", self.settings.site_base());
        let token = self
            .verifier
            .obtain_token(&target_url, &self.settings.verification.site_key)
            .await?;
        *self.reusable_verification.lock().await = Some(token.clone());
        Ok(token)
    }
}

fn first_wallet(response: &HttpResponse) -> Result<Wallet> {
    let wallets: Vec<Value> = response.json()?;
    let first = wallets
        .into_iter()
        .next()
        .ok_or_else(|| crate::Error::lookup("wallets[0]"))?;
    Ok(Wallet::deserialize(first)?)
}
