//! CLI integration tests
//!
//! Runs the `blaze-client` binary against a wiremock site.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Command isolated from the caller's configuration and environment
fn blaze(config_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("blaze-client");
    cmd.arg("--config")
        .arg(config_dir.path().join("missing.toml"))
        .env("XDG_CONFIG_HOME", config_dir.path())
        .env_remove("RUST_LOG")
        .env_remove("BLAZE_TOKEN")
        .env_remove("BLAZE_USERNAME")
        .env_remove("BLAZE_PASSWORD")
        .env_remove("BLAZE_BASE_URL")
        .env_remove("HTTPS_PROXY")
        .env_remove("HTTP_PROXY")
        .env_remove("ALL_PROXY");
    cmd
}

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("blaze-client");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let mut cmd = cargo_bin_cmd!("blaze-client");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("recent"))
        .stdout(predicate::str::contains("cashout"));
}

#[test]
fn test_unknown_game_rejected() {
    let dir = TempDir::new().unwrap();
    blaze(&dir)
        .args(["watch", "mines"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unknown game"));
}

#[test]
fn test_summary_without_credentials() {
    let dir = TempDir::new().unwrap();
    blaze(&dir)
        .arg("summary")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing credentials"));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[site]\nbase_url = \"ftp://blaze.example\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("blaze-client");
    cmd.arg("--config")
        .arg(&config)
        .env_remove("BLAZE_BASE_URL")
        .args(["recent", "double"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unsupported site scheme"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recent_prints_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/roulette_games/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"color": 1, "roll": 3, "created_at": "2023-05-01T12:00:30.123456Z"}
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = blaze(&dir)
        .env("BLAZE_BASE_URL", server.uri())
        .args(["recent", "roulette"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let page: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(
        page,
        json!({"items": [{"color": "vermelho", "value": 3, "created_date": "2023-05-01 12:00:30"}]})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bet_with_adopted_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wallets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 31, "balance": "9.00"}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/roulette_bets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "bet-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = blaze(&dir)
        .env("BLAZE_BASE_URL", server.uri())
        .args(["--token", "jwt", "bet", "double", "--color", "branco", "--amount", "1.5"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value =
        serde_json::from_str(String::from_utf8(output.stdout).unwrap().trim()).unwrap();
    assert_eq!(result["succeeded"], true);
    assert_eq!(result["raw_response"], json!({"id": "bet-9"}));
}
