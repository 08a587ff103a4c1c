//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the client.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration settings for the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Betting site configuration
    pub site: SiteSettings,
    /// Companion result server configuration
    pub server: ServerSettings,
    /// Verification token configuration
    pub verification: VerificationSettings,
    /// Game polling configuration
    pub polling: PollingSettings,
    /// Outbound network configuration
    pub network: NetworkSettings,
    /// Account credentials
    pub credentials: CredentialSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Betting site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Base URL of the site, without trailing slash
    pub base_url: String,
    /// Locale segment used in referer pages
    pub locale: String,
}

/// Companion server that exposes the last completed round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Verification token acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
    /// Base URL of the remote solving service
    pub service_url: String,
    /// Site key of the challenge widget
    pub site_key: String,
    /// Timeout for the solving service, in seconds
    pub timeout_secs: u64,
    /// External solver program and its leading arguments
    pub solver_command: Vec<String>,
}

/// Game polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Delay between poll iterations, in milliseconds
    pub interval_ms: u64,
    /// Consecutive failed iterations before polling reports a stall.
    /// Zero disables the bound.
    pub max_consecutive_failures: u32,
}

/// Outbound network configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// HTTP proxy URL
    pub http_proxy: Option<String>,
    /// Fallback proxy for all schemes
    pub all_proxy: Option<String>,
    /// User agent override
    pub user_agent: Option<String>,
    /// Request timeout, in seconds
    pub timeout_secs: Option<u64>,
}

/// Account credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Account username (email)
    pub username: Option<String>,
    /// Account password
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "https://blaze.com".to_string(),
            locale: "pt".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:63098".to_string(),
            site_key: String::new(),
            timeout_secs: 15,
            solver_command: Vec::new(),
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            max_consecutive_failures: 600,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl ServerSettings {
    /// Base URL of the companion server
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl VerificationSettings {
    /// Solving service timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingSettings {
    /// Delay between poll iterations
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Apply environment variable overrides on top of these settings
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(base_url) = std::env::var("BLAZE_BASE_URL") {
            self.site.base_url = base_url;
        }

        if let Ok(host) = std::env::var("BLAZE_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("BLAZE_SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid port: {}", e)))?;
        }

        if let Ok(site_key) = std::env::var("BLAZE_SITE_KEY") {
            self.verification.site_key = site_key;
        }

        if let Ok(service_url) = std::env::var("BLAZE_SOLVER_URL") {
            self.verification.service_url = service_url;
        }

        if let Ok(interval) = std::env::var("BLAZE_POLL_INTERVAL_MS") {
            self.polling.interval_ms = interval
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid poll interval: {}", e)))?;
        }

        if let Ok(username) = std::env::var("BLAZE_USERNAME") {
            self.credentials.username = Some(username);
        }

        if let Ok(password) = std::env::var("BLAZE_PASSWORD") {
            self.credentials.password = Some(password);
        }

        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            self.network.https_proxy = Some(proxy);
        }

        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            self.network.http_proxy = Some(proxy);
        }

        if let Ok(proxy) = std::env::var("ALL_PROXY") {
            self.network.all_proxy = Some(proxy);
        }

        Ok(self)
    }

    /// Check the settings for values the client cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        let base = url::Url::parse(&self.site.base_url)
            .map_err(|e| crate::Error::config(format!("Invalid site base_url: {}", e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(crate::Error::config(format!(
                "Unsupported site scheme: {}",
                base.scheme()
            )));
        }

        url::Url::parse(&self.verification.service_url)
            .map_err(|e| crate::Error::config(format!("Invalid solving service url: {}", e)))?;

        if self.server.host.trim().is_empty() {
            return Err(crate::Error::config("Companion server host is empty"));
        }

        if self.polling.interval_ms == 0 {
            return Err(crate::Error::config("Poll interval must be positive"));
        }

        Ok(())
    }

    /// Proxy URL with HTTPS > HTTP > ALL priority
    pub fn get_proxy_url(&self) -> Option<String> {
        self.network
            .https_proxy
            .clone()
            .or_else(|| self.network.http_proxy.clone())
            .or_else(|| self.network.all_proxy.clone())
    }

    /// Site base URL without trailing slash
    pub fn site_base(&self) -> &str {
        self.site.base_url.trim_end_matches('/')
    }

    /// Referer value for a page of the site, e.g. `games/double`
    pub fn referer(&self, page: &str) -> String {
        format!("{}/{}/{}", self.site_base(), self.site.locale, page)
    }
}
