use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::QualityTier,
};

const APP_DIR: &str = "yt-thumbnail-grabber";
const DEFAULT_FETCH_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub download_folder: PathBuf,
    /// Cosmetic pause before a valid link resolves
    pub fetch_delay: Duration,
    pub default_quality: QualityTier,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AppConfigFile {
    download_folder: Option<PathBuf>,
    fetch_delay_ms: Option<u64>,
    default_quality: Option<QualityTier>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfigFile::default().into()
    }
}

impl From<AppConfigFile> for AppConfig {
    fn from(file: AppConfigFile) -> Self {
        Self {
            download_folder: file.download_folder.unwrap_or_else(default_download_folder),
            fetch_delay: Duration::from_millis(file.fetch_delay_ms.unwrap_or(DEFAULT_FETCH_DELAY_MS)),
            default_quality: file.default_quality.unwrap_or(QualityTier::Maxres),
        }
    }
}

fn default_download_folder() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("./downloads"))
}

/// Where the config file is looked up when none is given on the command line.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

impl AppConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: AppConfigFile = toml::from_str(raw)?;
        Ok(file.into())
    }

    /// Loads an explicitly requested file, which must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!("loaded config from {}", path.display());
        Self::from_toml(&raw)
    }

    /// `explicit` if given; otherwise the per-user file when present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}
