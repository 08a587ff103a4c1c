//! Game streams: round polling, history and wagers
//!
//! The roulette ("double") and crash games share the same shape of
//! endpoints. [`GamePoller`] waits for round outcomes, [`HistoryClient`]
//! reads finished rounds and [`WagerClient`] places bets with the active
//! session.

pub mod history;
pub mod poller;
pub mod wager;

pub use history::HistoryClient;
pub use poller::{GamePoller, PollOptions};
pub use wager::{DEFAULT_AUTO_CASHOUT, WagerClient};
