//! HTTP client for the provider's list endpoints. Houses the `ProviderClient`
//! and the `PageSource` trait consumed by the paginator.

use crate::provider::endpoint::{Endpoint, API_KEY_PARAM};
use crate::provider::metrics::{ProviderMetrics, ProviderMetricsSnapshot};
use crate::provider::options::ProviderClientOptions;
use crate::runtime::config::{SyncConfig, ENV_API_KEY};
use crate::runtime::error::SyncError;
use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;
use reqwest::{header, Client};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

/// Source of raw list pages. The payload is returned undecoded so the paginator can
/// tell record lists apart from error-wrapped objects.
pub trait PageSource: Send + Sync {
    fn fetch_page<'a>(&'a self, endpoint: &'a Endpoint, page: u32) -> BoxFuture<'a, Result<Value>>;
}

#[derive(Debug, Clone)]
pub struct ProviderClient {
    base_url: Arc<String>,
    api_key: Option<Arc<String>>,
    client: Client,
    options: ProviderClientOptions,
    metrics: Arc<ProviderMetrics>,
}

impl PageSource for ProviderClient {
    fn fetch_page<'a>(&'a self, endpoint: &'a Endpoint, page: u32) -> BoxFuture<'a, Result<Value>> {
        Box::pin(self.fetch_page(endpoint, page))
    }
}

impl ProviderClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::with_options(base_url, api_key, ProviderClientOptions::default())
    }

    pub fn with_options(
        base_url: impl Into<String>,
        api_key: Option<String>,
        options: ProviderClientOptions,
    ) -> Result<Self> {
        options.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(options.user_agent.as_str())
            .timeout(options.request_timeout)
            .build()
            .context("failed to build provider HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_owned();

        Ok(Self {
            base_url: Arc::new(base_url),
            api_key: api_key.map(Arc::new),
            client,
            options,
            metrics: Arc::new(ProviderMetrics::default()),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let options = ProviderClientOptions {
            request_timeout: config.request_timeout(),
            ..ProviderClientOptions::default()
        };
        Self::with_options(
            config.base_url(),
            config.api_key().map(str::to_owned),
            options,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ProviderClientOptions {
        &self.options
    }

    pub fn metrics(&self) -> ProviderMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Absolute URL of `endpoint`, without query parameters.
    pub fn endpoint_url(&self, endpoint: &Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path().trim_start_matches('/'))
    }

    /// Requests one page and decodes the body as JSON.
    ///
    /// Non-2xx answers are still decoded when they carry JSON, because the provider reports
    /// rate limiting and bad credentials as error-wrapped objects the paginator inspects.
    pub async fn fetch_page(&self, endpoint: &Endpoint, page: u32) -> Result<Value> {
        let mut query = endpoint.page_query(page);
        if endpoint.is_authenticated() {
            let key = self.api_key.as_ref().ok_or(SyncError::MissingCredential {
                variable: ENV_API_KEY,
            })?;
            query.push((API_KEY_PARAM, key.as_str().to_owned()));
        }

        let url = self.endpoint_url(endpoint);
        let start = Instant::now();

        let result = self.request_json(&url, &query, endpoint, page).await;
        self.metrics.record(start.elapsed(), result.is_err());
        result
    }

    async fn request_json(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        endpoint: &Endpoint,
        page: u32,
    ) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("request to {} page {page} failed", endpoint.path()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read {} page {page} body", endpoint.path()))?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                tracing::debug!(
                    path = endpoint.path(),
                    page,
                    status = status.as_u16(),
                    bytes = body.len(),
                    "provider page received"
                );
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(SyncError::Provider {
                endpoint: endpoint.path().to_owned(),
                page,
                message: format!("HTTP {status}"),
            }
            .into()),
            Err(err) => Err(anyhow!(err).context(format!(
                "{} page {page} returned a body that is not JSON",
                endpoint.path()
            ))),
        }
    }
}
