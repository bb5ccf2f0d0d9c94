// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use crate::api::DEFAULT_API_URL;
use crate::filter::UnderutilizedThresholds;
use crate::query::QueryOptions;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "AGORA_API_URL";
pub const ACCESS_TOKEN_ENV: &str = "AGORA_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub query: QueryOptions,
    pub underutilized: UnderutilizedThresholds,
    /// Bearer token from the wallet-auth provider, if signed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            query: QueryOptions::default(),
            underutilized: UnderutilizedThresholds::default(),
            access_token: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Applies `AGORA_API_URL` / `AGORA_ACCESS_TOKEN` when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Some(url) = non_empty_env(API_URL_ENV) {
            debug!("API URL overridden from environment — url={}", url);
            self.api_url = url;
        }
        if let Some(token) = non_empty_env(ACCESS_TOKEN_ENV) {
            self.access_token = Some(token);
        }
    }

    /// Pretty JSON with the access token masked.
    pub fn to_display_json(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.access_token.is_some() {
            shown.access_token = Some("<redacted>".to_string());
        }
        serde_json::to_string_pretty(&shown).context("Failed to serialize config")
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "agora", "agora-discover")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".agora"))
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(get_config_root().join("config.json"))
    }
}

impl ConfigManager {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            debug!(
                "No config file, using defaults — path={}",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path).context("Failed to read config.json")?;

        serde_json::from_str(&content).context("Failed to parse config.json")
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config.json")
    }
}
