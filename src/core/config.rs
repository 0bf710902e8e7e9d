use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::url::normalize_base_url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "RULECHAT_BASE_URL";
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Backend origin, e.g. `http://localhost:8000`
    pub base_url: Option<String>,
    /// How many prior messages to request at startup
    pub history_limit: Option<u32>,
    /// Per-request timeout in seconds; unset leaves the transport default
    pub request_timeout: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let proj_dirs = ProjectDirs::from("org", "rulechat", "rulechat")
            .ok_or("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Flag beats environment beats config file beats the default.
    pub fn resolve_base_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        let chosen = [flag, env, self.base_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        normalize_base_url(chosen)
    }

    pub fn history_limit(&self) -> u32 {
        self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Apply `rulechat set <key> <value>`. Returns the confirmation line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<String, String> {
        let value = value.trim();
        match key {
            "base-url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(format!(
                        "base-url must start with http:// or https:// (got '{value}')"
                    ));
                }
                self.base_url = Some(normalize_base_url(value));
            }
            "history-limit" => {
                let limit = value
                    .parse::<u32>()
                    .ok()
                    .filter(|limit| *limit > 0)
                    .ok_or_else(|| format!("history-limit must be a positive number (got '{value}')"))?;
                self.history_limit = Some(limit);
            }
            "request-timeout" => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        format!("request-timeout must be a positive number of seconds (got '{value}')")
                    })?;
                self.request_timeout = Some(secs);
            }
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(format!("Set {key} to: {value}"))
    }

    pub fn unset(&mut self, key: &str) -> Result<String, String> {
        match key {
            "base-url" => self.base_url = None,
            "history-limit" => self.history_limit = None,
            "request-timeout" => self.request_timeout = None,
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(format!("Unset {key}"))
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, default {DEFAULT_BASE_URL})"),
        }
        match self.history_limit {
            Some(limit) => println!("  history-limit: {limit}"),
            None => println!("  history-limit: (unset, default {DEFAULT_HISTORY_LIMIT})"),
        }
        match self.request_timeout {
            Some(secs) => println!("  request-timeout: {secs}s"),
            None => println!("  request-timeout: (unset, no client timeout)"),
        }
    }
}
