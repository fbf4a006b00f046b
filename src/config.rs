use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::constants;
use crate::api::resilience::RetryConfig;

/// Connection settings for a single SharePoint site
#[derive(Debug, Clone)]
pub struct SharePointConfig {
    pub site_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the ACS token service
    pub accounts_url: String,
    pub retry: RetryConfig,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

/// On-disk shape of `config.toml`
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub site_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub accounts_url: Option<String>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl SharePointConfig {
    pub fn new(
        site_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            accounts_url: constants::ACCOUNTS_URL.to_string(),
            retry: RetryConfig::default(),
            user_agent: constants::USER_AGENT.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_accounts_url(mut self, accounts_url: impl Into<String>) -> Self {
        self.accounts_url = accounts_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read credentials from the process environment, loading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        info!("Importing SharePoint settings from environment variables");
        Self::from_vars("environment")
    }

    /// Read credentials from a specific `.env` file
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Importing SharePoint settings from .env file: {}", path.display());

        if !path.exists() {
            anyhow::bail!("Environment file not found: {}", path.display());
        }

        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load .env file '{}'", path.display()))?;

        Self::from_vars(&path.display().to_string())
    }

    fn from_vars(source: &str) -> Result<Self> {
        let site_url = require_var("SHAREPOINT_SITE_URL", source)?;
        let client_id = require_var("SHAREPOINT_CLIENT_ID", source)?;
        let client_secret = require_var("SHAREPOINT_CLIENT_SECRET", source)?;

        let mut config = Self::new(site_url, client_id, client_secret);
        if let Ok(accounts_url) = std::env::var("SHAREPOINT_ACCOUNTS_URL") {
            config.accounts_url = accounts_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default location of the CLI config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("sharepoint-cli")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".sharepoint-cli")
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {:?}", path);

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let mut config = Self::new(file.site_url, file.client_id, file.client_secret);
        if let Some(accounts_url) = file.accounts_url {
            config.accounts_url = accounts_url;
        }
        if let Some(max_attempts) = file.max_attempts {
            config.retry.max_attempts = max_attempts.max(1);
        }
        if let Some(timeout_secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Environment first, then the config file under the user's config directory
    pub fn load() -> Result<Self> {
        match Self::from_env() {
            Ok(config) => Ok(config),
            Err(env_err) => {
                let path = Self::config_path()?;
                if !path.exists() {
                    return Err(env_err.context(format!(
                        "No SharePoint settings in the environment and no config file at {:?}",
                        path
                    )));
                }
                Self::from_toml_file(&path)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.site_url)
            .with_context(|| format!("Invalid site URL: {}", self.site_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Site URL must use http or https: {}", self.site_url);
        }
        if url.host_str().is_none() {
            anyhow::bail!("Site URL has no host: {}", self.site_url);
        }
        if self.client_id.is_empty() {
            anyhow::bail!("Client id must not be empty");
        }

        Ok(())
    }
}

fn require_var(name: &str, source: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{} not set in {}", name, source))
}
