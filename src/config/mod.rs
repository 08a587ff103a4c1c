//! Configuration management for the client
//!
//! Settings are loaded once at process start and handed to the client
//! components as constructor input.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    CredentialSettings, LoggingSettings, NetworkSettings, PollingSettings, ServerSettings,
    Settings, SiteSettings, VerificationSettings,
};
