//! Settings file (`config.toml`).
//!
//! ```toml
//! [database]
//! dir = "~/joystick-profiles"
//!
//! [watch]
//! enabled = true
//! poll_interval_ms = 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::path::{default_config_file, default_db_dir, resolve_path, PathResolver};
use crate::error::{JoyError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSettings {
    /// Profile directory; defaults to `<config dir>/joycal/db`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WatchSettings {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

const fn default_true() -> bool {
    true
}

const fn default_poll_interval_ms() -> u64 {
    500
}

impl Settings {
    /// Parses settings text. Relative paths are resolved with `resolver`.
    pub fn from_toml(text: &str, resolver: Option<&PathResolver>) -> Result<Self> {
        let mut settings: Self =
            toml::from_str(text).map_err(|e| JoyError::ConfigParse(e.to_string()))?;

        if settings.watch.poll_interval_ms == 0 {
            return Err(JoyError::ConfigInvalid(
                "watch.poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(resolver) = resolver {
            if let Some(dir) = settings.database.dir.take() {
                settings.database.dir = Some(resolver.resolve(&dir)?);
            }
        }
        Ok(settings)
    }

    /// Loads settings from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults; an explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_file()?, false),
        };

        if !path.exists() {
            if explicit {
                return Err(JoyError::ConfigInvalid(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| JoyError::io(&path, e))?;
        let resolver = PathResolver::new(&path)?;
        let settings = Self::from_toml(&text, Some(&resolver))?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// The profile directory to use, applying an override when given.
    pub fn db_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            let cwd = std::env::current_dir().map_err(|e| JoyError::io(".", e))?;
            return resolve_path(dir, &cwd);
        }
        match &self.database.dir {
            Some(dir) => Ok(dir.clone()),
            None => default_db_dir(),
        }
    }
}
