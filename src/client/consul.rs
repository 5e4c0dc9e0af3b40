use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};

use crate::client::Api;
use crate::common::trace;
use crate::{KvseedError, Result};

const KV_PATH: [&str; 2] = ["v1", "kv"];

/// Client for the Consul key value HTTP API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Each `/` separated key segment becomes one percent-encoded path segment.
    fn kv_url(&self, key: &str, query: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| KvseedError::Config(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(KV_PATH)
            .extend(key.trim_start_matches('/').split('/'));
        url.set_query(query);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        Err(KvseedError::Store(format!(
            "{} responded {}: {}",
            url,
            status,
            body.trim()
        )))
    }
}

#[async_trait]
impl Api for Client {
    async fn get_keys(&self, prefix: &str) -> Result<Option<Vec<String>>> {
        let url = self.kv_url(prefix, Some("keys"))?;
        trace!(%url, "List keys");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Client::check(response).await?.bytes().await?;
        let keys = serde_json::from_slice::<Vec<String>>(&body)
            .map_err(|err| KvseedError::Store(format!("decode key list. {}", err)))?;

        Ok(Some(keys))
    }

    async fn delete_keys(&self, prefix: &str) -> Result<()> {
        let url = self.kv_url(prefix, Some("recurse"))?;
        trace!(%url, "Delete keys");

        Client::check(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        let url = self.kv_url(key, None)?;
        trace!(%url, "Put value");

        let response = self
            .http
            .put(url)
            .body(value.to_owned())
            .send()
            .await?;
        // Consul answers `false` when the write was not applied.
        let applied = Client::check(response).await?.text().await?;
        if applied.trim() == "false" {
            return Err(KvseedError::Store(format!("put {} was not applied", key)));
        }
        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let url = self.kv_url(key, Some("raw"))?;
        trace!(%url, "Get value");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value = Client::check(response).await?.text().await?;
        Ok(Some(value))
    }
}
