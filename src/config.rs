//! Configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const SUBSTITUTION_HISTORY_CAP: usize = 10;
pub const CALORIE_HISTORY_CAP: usize = 10;
pub const FLAVOR_HISTORY_CAP: usize = 5;
pub const ASSISTANT_HISTORY_CAP: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// History length bound for each tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCaps {
    pub substitution: usize,
    pub flavor: usize,
    pub assistant: usize,
    pub calories: usize,
}

impl Default for HistoryCaps {
    fn default() -> Self {
        Self {
            substitution: SUBSTITUTION_HISTORY_CAP,
            flavor: FLAVOR_HISTORY_CAP,
            assistant: ASSISTANT_HISTORY_CAP,
            calories: CALORIE_HISTORY_CAP,
        }
    }
}

impl HistoryCaps {
    pub fn uniform(cap: usize) -> Self {
        Self {
            substitution: cap,
            flavor: cap,
            assistant: cap,
            calories: cap,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_timeout: Duration,
    pub export_dir: PathBuf,
    pub history_caps: HistoryCaps,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Optional:
    /// - `FLAVOURSVERSE_API_URL`: API base URL (default: "http://localhost:8000")
    /// - `FLAVOURSVERSE_API_TIMEOUT_SECS`: request timeout (default: 10)
    /// - `FLAVOURSVERSE_EXPORT_DIR`: where recipe exports are written
    /// - `FLAVOURSVERSE_HISTORY_CAP`: one history cap for every tool
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("FLAVOURSVERSE_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "FLAVOURSVERSE_API_URL",
                value: api_url,
                reason: "must start with http:// or https://",
            });
        }

        let timeout_secs = match lookup("FLAVOURSVERSE_API_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "FLAVOURSVERSE_API_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be a positive whole number of seconds",
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let export_dir = lookup("FLAVOURSVERSE_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_export_dir);

        let history_caps = match lookup("FLAVOURSVERSE_HISTORY_CAP") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(cap) if cap > 0 => HistoryCaps::uniform(cap),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "FLAVOURSVERSE_HISTORY_CAP",
                        value: raw,
                        reason: "must be a positive whole number",
                    })
                }
            },
            None => HistoryCaps::default(),
        };

        Ok(Self {
            api_url,
            api_timeout: Duration::from_secs(timeout_secs),
            export_dir,
            history_caps,
        })
    }
}

/// `<project root>/exports`, found relative to the running executable
fn default_export_dir() -> PathBuf {
    let mut path = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("exports");
    path
}
