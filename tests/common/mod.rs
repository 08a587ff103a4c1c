//! Common test utilities and helpers
//!
//! Settings pointed at a wiremock server that plays the site, the solving
//! service and the companion server at once.

#![allow(dead_code)]

use blaze_client::{Settings, SessionManager};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const USERNAME: &str = "player@example.com";
pub const PASSWORD: &str = "hunter2";

/// Settings with every remote endpoint on `server`
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.site.base_url = server.uri();
    settings.verification.service_url = server.uri();
    settings.verification.site_key = "site-key".to_string();
    settings.server.host = server.address().ip().to_string();
    settings.server.port = server.address().port();
    settings.polling.interval_ms = 10;
    settings.credentials.username = Some(USERNAME.to_string());
    settings.credentials.password = Some(PASSWORD.to_string());
    settings
}

/// Session manager over the real reqwest transport
pub fn session_for(server: &MockServer) -> SessionManager {
    SessionManager::new(settings_for(server)).unwrap()
}

/// Solving service handing out `token`
pub async fn mount_solver(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/hcaptcha/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"x-captcha-response": token})))
        .mount(server)
        .await;
}

/// Password grant issuing `access_token`
pub async fn mount_login(server: &MockServer, access_token: &str) {
    Mock::given(method("PUT"))
        .and(path("/api/auth/password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": access_token})))
        .mount(server)
        .await;
}

/// Single wallet with the given id and balance
pub async fn mount_wallet(server: &MockServer, id: u64, balance: &str) {
    Mock::given(method("GET"))
        .and(path("/api/wallets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": id, "balance": balance, "currency_type": "BRL"}
        ])))
        .mount(server)
        .await;
}
