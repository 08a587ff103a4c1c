//! Configuration loading
//!
//! Settings are layered: built-in defaults, then a TOML file, then `BLAZE_*`
//! and proxy environment variables. The result is validated once and handed
//! to the client as constructor input.

use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolves and layers the configuration sources
#[derive(Debug)]
pub struct ConfigLoader {
    defaults: Settings,
    use_default_path: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
            use_default_path: true,
        }
    }

    /// Do not fall back to the platform config file when no path is given
    pub fn without_default_path(mut self) -> Self {
        self.use_default_path = false;
        self
    }

    /// Platform location of the configuration file,
    /// e.g. `~/.config/blaze-client/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blaze-client").join("config.toml"))
    }

    /// File to read: the explicit one, else the platform default if enabled
    pub fn resolve_path(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None if self.use_default_path => Self::default_path(),
            None => None,
        }
    }

    /// Defaults, overlaid by the config file, overlaid by the environment.
    ///
    /// A missing explicit file is reported and skipped; a missing default
    /// file is expected and skipped silently. A file that fails to parse is
    /// an error either way.
    pub fn load(&self, explicit: Option<&Path>) -> Result<Settings> {
        let settings = match self.resolve_path(explicit) {
            Some(path) if path.is_file() => {
                info!("Reading configuration from {}", path.display());
                Settings::from_file(&path)?
            }
            Some(path) if explicit.is_some() => {
                warn!("Configuration file {} not found, using defaults", path.display());
                self.defaults.clone()
            }
            _ => self.defaults.clone(),
        };

        let settings = settings.merge_with_env()?;
        settings.validate()?;
        debug!("Effective configuration: {:?}", settings);
        Ok(settings)
    }

    /// Defaults overlaid by the environment, no file
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = self.defaults.clone().merge_with_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
