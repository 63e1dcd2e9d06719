//! Configuration API
//!
//! Fetches the server-side configuration document the store is seeded from.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::constants::CONFIG_ENDPOINT;
use crate::error::{InvalidSnafu, Result, StatusSnafu};
use crate::settings::ClientSettings;

/// Source of the remote configuration document
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the configuration as a JSON object
    async fn fetch(&self) -> Result<Map<String, Value>>;
}

/// Join a base url with the configuration endpoint
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), CONFIG_ENDPOINT)
}

/// `ConfigSource` backed by `GET /api/system/configuration`
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    client: reqwest::Client,
    url: String,
}

impl HttpConfigSource {
    /// Create a source for the given server base url
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            url: endpoint_url(base_url),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    /// Full endpoint url
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<Map<String, Value>> {
        debug!(url = %self.url, "Fetching configuration");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return StatusSnafu {
                status: status.as_u16(),
                url: self.url.clone(),
            }
            .fail();
        }

        match response.json::<Value>().await? {
            Value::Object(map) => Ok(map),
            other => InvalidSnafu {
                message: format!("configuration payload is not an object: {other}"),
            }
            .fail(),
        }
    }
}
