/// Configuration module for the FullStop runner.
///
/// Only host-window placement and the log filter are configurable. The
/// application identity (mutex name, window class and title, URI scheme)
/// lives in [`crate::identity`] and is fixed across versions.
///
/// The configuration is loaded from a `config.json` file located in the
/// platform-specific configuration directory (%APPDATA%/FullStop/ on Windows).
/// A missing or unreadable file yields the defaults.
///
/// # Example
///
/// ```rust,no_run
/// use fullstop_core::config::{load_config, save_config};
///
/// let mut config = load_config();
/// config.window.width = 1600;
/// save_config(&config).expect("Failed to save config");
/// ```
use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Initial placement of the host window
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        WindowGeometry {
            x: 10,
            y: 10,
            width: 1280,
            height: 720,
        }
    }
}

/// Runner configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    pub window: WindowGeometry,
    /// `tracing` filter directive used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            window: WindowGeometry::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// Get the application's config directory
/// Returns %APPDATA%/FullStop/ on Windows
/// Creates directory if it doesn't exist
pub fn get_config_directory() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "FullStop")
        .ok_or_else(|| Error::Config("Failed to determine user config directory".to_string()))?;

    let config_dir = project_dirs.config_dir();

    fs::create_dir_all(config_dir)
        .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;

    Ok(config_dir.to_path_buf())
}

/// Load configuration from the user's config directory.
/// Returns default config if the file doesn't exist or on error.
pub fn load_config() -> RunnerConfig {
    match get_config_directory() {
        Ok(dir) => load_config_from(&dir),
        Err(_) => RunnerConfig::default(),
    }
}

/// Load `config.json` from `dir`
pub fn load_config_from(dir: &Path) -> RunnerConfig {
    let config_path = dir.join(CONFIG_FILE);

    if !config_path.exists() {
        return RunnerConfig::default();
    }

    let Ok(contents) = fs::read_to_string(&config_path) else {
        return RunnerConfig::default();
    };

    serde_json::from_str(&contents).unwrap_or_default()
}

/// Save configuration to the user's config directory
pub fn save_config(config: &RunnerConfig) -> Result<()> {
    save_config_to(&get_config_directory()?, config)
}

/// Write `config` as `config.json` into `dir`
pub fn save_config_to(dir: &Path, config: &RunnerConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(dir.join(CONFIG_FILE), json)
        .map_err(|e| Error::Config(format!("Failed to write {}: {}", CONFIG_FILE, e)))?;

    Ok(())
}
