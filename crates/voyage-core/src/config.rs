//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::CoreError;
use crate::Result;

const DEFAULT_API_URL: &str = "http://localhost:3000/api/auth";
const API_URL_VAR: &str = "VOYAGE_API_URL";
const DATA_DIR_VAR: &str = "VOYAGE_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Auth API (endpoints are appended to it)
    pub api_base_url: Url,
    /// Path to the database holding the persisted session
    pub database_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            // Constant input
            api_base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            database_path: data_dir.join("voyage.db"),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Voyage"))
            .unwrap_or_else(|| PathBuf::from(".voyage"))
    }

    /// Defaults overridden by `VOYAGE_API_URL` and `VOYAGE_DATA_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = var(DATA_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::data_dir);

        let mut config = Self::new(data_dir);

        if let Some(raw) = var(API_URL_VAR).filter(|url| !url.trim().is_empty()) {
            let url = Url::parse(raw.trim())?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(CoreError::Config(format!(
                    "{API_URL_VAR} must be an http(s) URL, got {url}"
                )));
            }
            config.api_base_url = url;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Platform data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
