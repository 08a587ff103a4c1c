//! Type definitions for the Blaze client
//!
//! Round state, history records, account payloads and wager envelopes.

pub mod account;
pub mod game;
pub mod history;
pub mod serde_helpers;
pub mod wager;

pub use account::{AuthOutcome, UserSummary, Wallet};
pub use game::{CrashOutcome, CrashRound, DoubleOutcome, GameKind, RouletteRound};
pub use history::{Color, CrashRecord, HistoryPage, HistoryRecord, RouletteRecord};
pub use wager::{WagerResult, roulette_color_code};
