use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable that overrides `storage.bucket`.
pub const BUCKET_ENV_VAR: &str = "GCS_BUCKET_ID";

const DEFAULT_CREDENTIALS_PATH: &str = "credentials/google-cloud-credentials.json";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: crate::providers::open_exchange_rates::DEFAULT_BASE_URL.to_string(),
            app_id: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Target GCS bucket id. `GCS_BUCKET_ID` in the environment wins.
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Service-account key file; defaults to the conventional path.
    #[serde(default)]
    pub credentials: Option<String>,
    /// Write CSVs to a local directory instead of a bucket.
    #[serde(default)]
    pub local_dir: Option<String>,
}

fn default_prefix() -> String {
    "data".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            bucket: None,
            prefix: default_prefix(),
            credentials: None,
            local_dir: None,
        }
    }
}

impl StorageConfig {
    /// Bucket id with the environment taking precedence over the file.
    pub fn resolve_bucket(&self) -> Option<String> {
        self.bucket_with_override(std::env::var(BUCKET_ENV_VAR).ok().as_deref())
    }

    pub(crate) fn bucket_with_override(&self, env_bucket: Option<&str>) -> Option<String> {
        env_bucket
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| self.bucket.clone())
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxfeed", "fxfeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
