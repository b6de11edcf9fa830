// Configuration loader
// Loads settings from <config_dir>/guideline-assistant/config.toml, falling
// back to built-in defaults when the file does not exist

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::constants::{APP_NAME, CONFIG_FILE_NAME};
use super::settings::Config;

/// Location of the user config file, if a config directory exists
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from the user config file or defaults
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Load and validate a specific config file
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse TOML text; every field is optional
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}
