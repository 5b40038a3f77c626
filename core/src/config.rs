// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine configuration (TOML)

use crate::drawing::DrawingKind;
use crate::CodecError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_scenario_name")]
    pub default_scenario_name: String,
    #[serde(default = "default_temporary_lifetime_ms")]
    pub temporary_drawing_lifetime_ms: u64,
    #[serde(default = "default_drawing_color")]
    pub default_drawing_color: String,
    #[serde(default)]
    pub default_tool: DrawingKind,
}

fn default_scenario_name() -> String {
    "Startelf".to_string()
}

fn default_temporary_lifetime_ms() -> u64 {
    3000
}

fn default_drawing_color() -> String {
    "#FFD60A".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_scenario_name: default_scenario_name(),
            temporary_drawing_lifetime_ms: default_temporary_lifetime_ms(),
            default_drawing_color: default_drawing_color(),
            default_tool: DrawingKind::default(),
        }
    }
}

impl EngineConfig {
    pub fn temporary_drawing_lifetime(&self) -> Duration {
        Duration::from_millis(self.temporary_drawing_lifetime_ms)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CodecError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, CodecError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("io", "tacboard", "tacboard")
        .context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load the config at `path`, writing defaults there if it does not exist
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        tracing::info!("Config file not found, creating default at: {}", path.display());
        let config = EngineConfig::default();
        save_config(path, &config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    EngineConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn save_config(path: &Path, config: &EngineConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let toml_content = config.to_toml_string().context("Failed to serialize config")?;
    fs::write(path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    tracing::info!("Saved config to: {}", path.display());
    Ok(())
}
