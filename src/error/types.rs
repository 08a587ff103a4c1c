//! Error type definitions
//!
//! Defines the main error types used throughout the client. Remote API error
//! payloads are not represented here: they are handed back to callers as data.

use std::time::Duration;
use thiserror::Error;

/// Main error type for the Blaze client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session management errors
    #[error("Session error: {0}")]
    Session(String),

    /// Login requested without username/password
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Every verification token tier failed
    #[error("Verification token unavailable after {attempts} attempt(s)")]
    VerificationUnavailable { attempts: usize },

    /// Expected field absent from a remote payload
    #[error("Lookup failed: missing field `{field}`")]
    Lookup { field: String },

    /// Wager attempted before a wallet id was fetched
    #[error("No wallet id in session, fetch the balance first")]
    WalletUnavailable,

    /// Polling gave up after too many consecutive failed iterations
    #[error("Polling stalled for {game} after {failures} consecutive failures")]
    PollingStalled { game: String, failures: u32 },

    /// Polling cancelled by the caller
    #[error("Polling cancelled for {game}")]
    PollingCancelled { game: String },

    /// Polling deadline elapsed before a terminal outcome appeared
    #[error("No outcome for {game} within {waited:?}")]
    PollingDeadline { game: String, waited: Duration },

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Transport failures not raised by reqwest itself
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Date/time parsing errors
    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    /// Configuration file parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Create a missing credentials error
    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::MissingCredentials(msg.into())
    }

    /// Create a lookup error for an absent field
    pub fn lookup(field: impl Into<String>) -> Self {
        Self::Lookup {
            field: field.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether the error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Transport(_))
    }
}
