use crate::runtime::error::SyncError;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEY: &str = "COINGECKO_API_KEY";
pub const ENV_BASE_URL: &str = "COINGECKO_BASE_API";
pub const ENV_DATA_DIR: &str = "DATA_FOLDER";
pub const ENV_PAGE_DELAY_MS: &str = "COINCACHE_PAGE_DELAY_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "COINCACHE_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_DATA_DIR: &str = "data";
// The public tier allows roughly 30 requests per minute.
const DEFAULT_PAGE_DELAY_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for a sync run.
///
/// All instances must be constructed via [`SyncConfig::builder`], [`SyncConfig::from_env`]
/// or [`SyncConfig::new`] so invariants are validated before any job observes the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    base_url: String,
    api_key: Option<String>,
    data_dir: PathBuf,
    page_delay: Duration,
    request_timeout: Duration,
}

pub struct SyncConfigParams {
    pub base_url: String,
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    pub page_delay: Duration,
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Returns a builder to incrementally construct and validate a configuration.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        SyncConfigBuilder::from_env()?.build()
    }

    /// Constructs a configuration directly from the provided values.
    pub fn new(params: SyncConfigParams) -> Result<Self> {
        let SyncConfigParams {
            base_url,
            api_key,
            data_dir,
            page_delay,
            request_timeout,
        } = params;

        let config = Self {
            base_url: trimmed_string(base_url)
                .trim_end_matches('/')
                .to_owned(),
            api_key: api_key
                .map(trimmed_string)
                .filter(|key| !key.is_empty()),
            data_dir,
            page_delay,
            request_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Provider API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential sent to authenticated endpoints, if one was configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the credential or a configuration error naming the missing variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key().ok_or_else(|| {
            SyncError::MissingCredential {
                variable: ENV_API_KEY,
            }
            .into()
        })
    }

    /// Directory under which every catalog root is created.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Pause inserted before every page request.
    pub fn page_delay(&self) -> Duration {
        self.page_delay
    }

    /// Per-request timeout applied by the HTTP transport.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Performs validation on an existing configuration instance.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.base_url)?;

        if self.data_dir.as_os_str().is_empty() {
            bail!("data_dir cannot be empty");
        }

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct SyncConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    data_dir: Option<PathBuf>,
    page_delay: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl SyncConfigBuilder {
    /// Seeds a builder from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Seeds a builder from an arbitrary variable lookup. Unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            builder = builder.base_url(url);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            builder = builder.api_key(key);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            builder = builder.data_dir(dir);
        }
        if let Some(raw) = lookup(ENV_PAGE_DELAY_MS) {
            let millis = parse_u64(&raw, ENV_PAGE_DELAY_MS)?;
            builder = builder.page_delay(Duration::from_millis(millis));
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = parse_u64(&raw, ENV_REQUEST_TIMEOUT_SECS)?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        Ok(builder)
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = Some(delay);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<SyncConfig> {
        let params = SyncConfigParams {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            api_key: self.api_key,
            data_dir: self
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            page_delay: self
                .page_delay
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_PAGE_DELAY_MS)),
            request_timeout: self
                .request_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        };

        SyncConfig::new(params)
    }
}

fn trimmed_string(value: String) -> String {
    value.trim().to_owned()
}

fn parse_u64(raw: &str, variable: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{variable} must be a non-negative integer, got {raw:?}"))
}

fn validate_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("base_url must start with http:// or https://");
    }
    Ok(())
}
