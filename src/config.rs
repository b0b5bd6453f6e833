//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rscatalog/rscatalog.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `RSCATALOG_*` prefix

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{SettingsError, SettingsResult};

/// Unified configuration for rscatalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Decimal places for rendered prices (None: print as stored)
    pub price_precision: Option<u32>,
    /// Display name per descriptor key (unmapped keys display as the key)
    pub display_names: BTreeMap<String, String>,
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub price_precision: Option<u32>,
    pub display_names: Option<BTreeMap<String, String>>,
}

/// Get the XDG config directory for rscatalog.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rscatalog").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rscatalog.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> SettingsResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn env_err(e: ConfigError) -> SettingsError {
    SettingsError::Environment(e.to_string())
}

impl Settings {
    /// Merge overlay config onto self (base).
    ///
    /// - Scalars: overlay wins if Some, otherwise keep base
    /// - Display names: key-wise, overlay entries win
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut display_names = self.display_names.clone();
        if let Some(names) = &overlay.display_names {
            display_names.extend(names.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            price_precision: overlay.price_precision.or(self.price_precision),
            display_names,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// The global file is optional. A local file, when given, must exist.
    pub fn load(local: Option<&Path>) -> SettingsResult<Self> {
        let current = Self::load_files(global_config_path().as_deref(), local)?;
        Self::apply_env_overrides(current)
    }

    /// Defaults merged with the given files, without environment overrides.
    #[instrument(level = "debug")]
    pub fn load_files(global: Option<&Path>, local: Option<&Path>) -> SettingsResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        Ok(current)
    }

    /// Apply RSCATALOG_* environment variables as explicit overrides.
    ///
    /// `RSCATALOG_PRICE_PRECISION=2`, `RSCATALOG_DISPLAY_NAMES__SHOES="Running shoes"`
    fn apply_env_overrides(mut settings: Self) -> SettingsResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RSCATALOG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(env_err)?;

        match config.get::<u32>("price_precision") {
            Ok(val) => settings.price_precision = Some(val),
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(env_err(e)),
        }
        match config.get::<HashMap<String, String>>("display_names") {
            Ok(names) => settings.display_names.extend(names),
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(env_err(e)),
        }

        Ok(settings)
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> SettingsResult<String> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Render(e.to_string()))
    }
}
