//! Command-line interface
//!
//! Argument definitions live here; [`commands`] runs them against a
//! [`blaze_client::BlazeClient`] and prints JSON on stdout.

pub mod commands;

use blaze_client::GameKind;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Session and polling client for the Blaze betting site
#[derive(Debug, Parser)]
#[command(name = "blaze-client", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bearer token to adopt instead of logging in
    #[arg(long, global = true, env = "BLAZE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Debug logging, and a live status line while watching
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate and print the outcome
    Login {
        /// Verification token solved beforehand
        #[arg(long, value_name = "TOKEN")]
        verification_token: Option<String>,
    },

    /// Print username, balance, wallet id and tax id
    Summary,

    /// Wait for the next round outcome
    Watch {
        /// double (roulette) or crash
        game: GameKind,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Print the latest finished rounds
    Recent {
        game: GameKind,
    },

    /// Print a page of the round history
    History {
        game: GameKind,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Print the page as returned by the site
        #[arg(long)]
        raw: bool,
    },

    /// Place a wager
    #[command(subcommand)]
    Bet(BetCommand),

    /// Cash out of the current crash round
    Cashout,
}

#[derive(Debug, Subcommand)]
pub enum BetCommand {
    /// Bet on a roulette color
    Double {
        #[arg(long, value_parser = ["branco", "vermelho", "preto"])]
        color: String,

        #[arg(long)]
        amount: Decimal,
    },

    /// Enter the current crash round
    Crash {
        #[arg(long)]
        amount: Decimal,

        /// Auto cash-out multiplier
        #[arg(long, value_name = "MULTIPLIER")]
        cashout: Option<Decimal>,
    },
}
