use std::fmt;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tokio::time::Duration;

use crate::common::trace;
use crate::config::StoreConfig;

/// Why a single health check failed.
#[derive(Debug)]
pub enum ProbeError {
    // Protocol, host or port do not form a usable url.
    Endpoint(String),
    // Connection refused, timed out or broken.
    Request(reqwest::Error),
    Status(StatusCode),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProbeError::Endpoint(description) => write!(f, "malformed endpoint. {}", description),
            ProbeError::Request(err) => write!(f, "request failed. {}", err),
            ProbeError::Status(status) => write!(f, "unexpected status {}", status),
        }
    }
}

impl std::error::Error for ProbeError {}

/// One reachability check against the store.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> Result<(), ProbeError>;
}

/// Checks the store's status endpoint over HTTP. Any 2xx is healthy.
pub struct HttpProbe {
    http: reqwest::Client,
    status_url: Result<Url, String>,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(store: &StoreConfig, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            status_url: store.status_url().map_err(|err| err.to_string()),
            timeout,
        }
    }

    pub fn with_url(status_url: Url, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            status_url: Ok(status_url),
            timeout,
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        let url = self.status_url.clone().map_err(ProbeError::Endpoint)?;
        trace!(%url, "Probe store");

        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ProbeError::Request)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(response.status()))
        }
    }
}
