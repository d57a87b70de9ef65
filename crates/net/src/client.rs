//! HTTP client with connection pooling

use gotools_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            user_agent: format!("update-gotools/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ClientInit(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a single GET request
    ///
    /// Non-success statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts and connection or protocol failures.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::convert_error(url, &e))
    }

    fn convert_error(url: &str, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
            }
            .into()
        } else {
            NetworkError::RequestFailed {
                url: url.to_string(),
                message: error.to_string(),
            }
            .into()
        }
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
