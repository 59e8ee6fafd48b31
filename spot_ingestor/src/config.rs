//! Runtime settings, loaded from an optional TOML file.
//!
//! ```toml
//! base_url = "https://web-api.tp.entsoe.eu/api"
//! archive_dir = "docs/electricity"
//! merge_policy = "union"
//!
//! [rate_limit]
//! max_calls = 60
//! period_secs = 60
//!
//! [[price_areas]]
//! code = "SE3"
//! eic_code = "10Y1001A1001A46L"
//! ```
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archive::MergePolicy;
use crate::models::area::{PriceArea, default_areas};
use crate::providers::entsoe::provider::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub archive_dir: PathBuf,
    pub merge_policy: MergePolicy,
    pub rate_limit: RateLimitSettings,
    pub price_areas: Vec<PriceArea>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            archive_dir: PathBuf::from("docs/electricity"),
            merge_policy: MergePolicy::default(),
            rate_limit: RateLimitSettings::default(),
            price_areas: default_areas(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Looks a price area up by its zone code.
    pub fn area(&self, code: &str) -> Option<&PriceArea> {
        self.price_areas.iter().find(|area| area.code == code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_calls: usize,
    pub period_secs: u64,
}

impl RateLimitSettings {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        // one call a second on average, matching the upstream's courtesy rate
        Self {
            max_calls: 60,
            period_secs: 60,
        }
    }
}
