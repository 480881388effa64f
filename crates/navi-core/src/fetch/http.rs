//! HTTP fetcher for a live debugging data source

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::model::{Forest, Node};
use crate::path::RefPath;

use super::Fetcher;

/// Default data source address
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Path of the forest summary on the data source
const DEFAULT_FOREST_ENDPOINT: &str = "/tt";

/// Default request timeout (in seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches nodes (and the forest) over HTTP
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: HttpClient,
    base_url: String,
    forest_endpoint: String,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("base_url", &self.base_url)
            .field("forest_endpoint", &self.forest_endpoint)
            .finish()
    }
}

/// Builder for creating an HttpFetcher
pub struct HttpFetcherBuilder {
    base_url: Option<String>,
    forest_endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcherBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            forest_endpoint: None,
            timeout_secs: None,
        }
    }

    /// Take base URL, forest endpoint and timeout from configuration
    pub fn config(mut self, config: &SourceConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.forest_endpoint = Some(config.forest_endpoint.clone());
        self.timeout_secs = Some(config.timeout_secs);
        self
    }

    /// Set the base URL (defaults to http://localhost:8080)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn forest_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.forest_endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<HttpFetcher> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!(
                "base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(HttpFetcher {
            http_client,
            base_url,
            forest_endpoint: self
                .forest_endpoint
                .unwrap_or_else(|| DEFAULT_FOREST_ENDPOINT.to_string()),
        })
    }
}

impl HttpFetcher {
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a path on the data source
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        debug!(url = %url, "GET");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchFailed {
                    path: path.to_string(),
                    reason: "request timed out".to_string(),
                }
            } else {
                Error::NetworkError(e)
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch the forest summary. Accepts a bare JSON forest or a page
    /// embedding one.
    pub async fn fetch_forest(&self) -> Result<Forest> {
        let body = self.get_text(&self.forest_endpoint).await?;
        Forest::from_page(&body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &RefPath) -> Result<Node> {
        let body = self.get_text(path.as_str()).await?;
        Node::from_json(&body)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
