//! Application settings loaded from config.toml
//!
//! Every section is optional; omitted keys fall back to their defaults. The path
//! can be overridden with the `CONFIG_PATH` environment variable.

use crate::errors::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Order intake rules
    pub orders: OrderSettings,
    /// Report rendering settings
    pub reports: ReportSettings,
    /// Menus to seed when the catalog is empty
    pub menus: Vec<MenuSeed>,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// `[orders]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderSettings {
    /// Recompute the order total from its items and reject mismatches.
    /// Off by default: the submitted total is stored as-is.
    pub verify_totals: bool,
}

/// `[reports]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Offset of the restaurant's local time from UTC, in minutes.
    /// Report day boundaries are local midnights at this offset.
    pub utc_offset_minutes: i32,
    /// Currency sign appended to amounts in exported reports
    pub currency_symbol: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            currency_symbol: "₸".to_string(),
        }
    }
}

impl ReportSettings {
    /// The configured offset as a chrono timezone.
    ///
    /// # Errors
    /// Returns `Error::Config` if the offset is outside ±24 hours.
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| Error::Config {
            message: format!(
                "reports.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ),
        })
    }
}

/// A `[[menus]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct MenuSeed {
    /// Menu name
    pub name: String,
}

impl Settings {
    /// Checks values serde cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        self.reports.offset()?;
        if self.server.bind_address.trim().is_empty() {
            return Err(Error::Config {
                message: "server.bind_address cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or a value is out of range.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from `CONFIG_PATH` (default `./config.toml`).
///
/// A missing file is not an error: defaults are used and a warning is logged.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        let settings = load_settings(&path)?;
        info!("Loaded configuration from {}", path);
        Ok(settings)
    } else {
        warn!("Config file {} not found, using defaults", path);
        Ok(Settings::default())
    }
}
