//! Blaze Client - session and polling client for the Blaze betting site
//!
//! Authenticates an account (password grant behind a human-verification
//! gate), reads its wallet, polls the roulette ("double") and crash game
//! streams for round outcomes, normalizes recent history and places or
//! cashes out wagers.
//!
//! # Architecture
//!
//! - [`SessionManager`] owns the bearer token, login flag and wallet id
//! - [`session::VerificationTokenProvider`] obtains verification tokens
//!   through a chain of substitutable tiers
//! - [`GamePoller`] waits for round outcomes with a fixed poll interval
//! - [`game::HistoryClient`] normalizes finished rounds into labeled records
//! - [`WagerClient`] places bets and reports a uniform [`types::WagerResult`]
//! - [`BlazeClient`] wires them over one shared [`transport::Transport`]
//!
//! # Usage
//!
//! ```bash
//! blaze-client watch double --verbose
//! blaze-client bet double --color vermelho --amount 2.5
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use blaze_client::{BlazeClient, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = BlazeClient::new(Settings::from_env()?)?;
//! client.session().authenticate(None).await?;
//!
//! let outcome = client.poller().await_double().await?;
//! println!("roll {} color {}", outcome.roll, outcome.color);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::BlazeClient;
pub use config::Settings;
pub use error::{Error, Result};
pub use game::{GamePoller, PollOptions, WagerClient};
pub use session::SessionManager;
pub use types::{CrashOutcome, DoubleOutcome, GameKind, HistoryRecord, WagerResult};
