use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const OFFERS_URL_ENV: &str = "HUBBER_OFFERS_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote offers feed. Only the download command needs it.
    pub offers_url: Option<String>,
    /// Directory the blob storage is rooted at.
    pub storage_root: PathBuf,
    /// Folder inside the storage holding `export_<timestamp>.xml` files.
    pub exports_folder: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            offers_url: None,
            storage_root: PathBuf::from("storage/app"),
            exports_folder: "exports".to_string(),
            request_timeout_seconds: 30,
            user_agent: concat!("hubber-diff/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads the JSON config at `path`; a missing file means defaults.
/// `HUBBER_OFFERS_URL` from the environment wins over the file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading overrides through `env` instead of the process environment.
pub fn load_config_with<E>(path: &Path, env: E) -> Result<AppConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if let Some(url) = env(OFFERS_URL_ENV).filter(|url| !url.trim().is_empty()) {
        info!("Using offers URL from {}", OFFERS_URL_ENV);
        config.offers_url = Some(url);
    }
    Ok(config)
}
