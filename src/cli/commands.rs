//! Command execution
//!
//! Every command prints a single JSON document on stdout; logs go to stderr.

use super::{BetCommand, Cli, Command};
use anyhow::{Context, Result};
use blaze_client::{BlazeClient, GameKind, PollOptions, Settings, types::AuthOutcome};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::watch;

/// Run the parsed command line against a freshly built client
pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let client = BlazeClient::new(settings).context("failed to build client")?;

    match cli.command {
        Command::Login { verification_token } => {
            if let Some(token) = verification_token {
                client.session().seed_verification_token(token).await;
            }
            let outcome = client.session().authenticate(cli.token.as_deref()).await?;
            print_json(&login_report(&outcome))
        }
        Command::Summary => {
            ensure_session(&client, cli.token.as_deref()).await?;
            let summary = client.session().fetch_user_summary().await?;
            print_json(&summary)
        }
        Command::Watch { game, timeout } => {
            if cli.token.is_some() {
                ensure_session(&client, cli.token.as_deref()).await?;
            }
            let options = watch_options(&client, cli.verbose, timeout);
            match game {
                GameKind::Double => print_json(&client.poller().await_double_with(&options).await?),
                GameKind::Crash => print_json(&client.poller().await_crash_with(&options).await?),
            }
        }
        Command::Recent { game } => match client.history().recent(game).await? {
            Some(page) => print_json(&page),
            None => anyhow::bail!("recent {} rounds are unavailable", game),
        },
        Command::History { game, page, raw } => {
            if raw {
                print_json(&client.history().history(game, page).await?)
            } else {
                print_json(&client.history().history_records(game, page).await?)
            }
        }
        Command::Bet(bet) => {
            ensure_session(&client, cli.token.as_deref()).await?;
            client
                .session()
                .fetch_balance()
                .await?
                .context("wallet unavailable, cannot place a wager")?;

            let result = match bet {
                BetCommand::Double { color, amount } => {
                    client.wagers().place_roulette_bet(&color, amount).await?
                }
                BetCommand::Crash { amount, cashout } => {
                    client.wagers().place_crash_bet(amount, cashout).await?
                }
            };
            print_json(&result)
        }
        Command::Cashout => {
            ensure_session(&client, cli.token.as_deref()).await?;
            print_json(&client.wagers().cashout_crash().await?)
        }
    }
}

/// Adopt the given token, or log in with the configured credentials
async fn ensure_session(client: &BlazeClient, token: Option<&str>) -> Result<()> {
    let outcome = client.session().authenticate(token).await?;
    if !outcome.is_authenticated() {
        anyhow::bail!(
            "login rejected: {}",
            outcome.payload().cloned().unwrap_or(Value::Null)
        );
    }
    Ok(())
}

fn login_report(outcome: &AuthOutcome) -> Value {
    json!({
        "authenticated": outcome.is_authenticated(),
        "payload": outcome.payload(),
    })
}

/// Poll options for `watch`, cancelled on Ctrl-C
fn watch_options(client: &BlazeClient, verbose: bool, timeout: Option<u64>) -> PollOptions {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling poll");
            let _ = cancel_tx.send(true);
        }
    });

    let mut options = client
        .poller()
        .options()
        .clone()
        .verbose(verbose)
        .with_cancel(cancel_rx);
    if let Some(secs) = timeout {
        options = options.with_deadline(Duration::from_secs(secs));
    }
    options
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
