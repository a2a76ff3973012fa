// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration loaded from prodboard.toml.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub sheet: SheetConfig,
    pub server: ServerConfig,
}

/// Published spreadsheet to pull the dashboard data from.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    /// GID of the tab holding the daily KPI grid.
    pub gid: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1-FK8TscyxAxCI1MCp8Hix7GdLut6vQKavRawbIgwzlg".into(),
            gid: "845270258".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}
