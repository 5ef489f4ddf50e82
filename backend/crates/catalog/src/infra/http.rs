//! HTTP Listing Source
//!
//! Fetches the community listing as a JSON array over HTTP.

use crate::domain::source::{BoxError, RemoteSource};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// GETs `url` and expects a JSON array in return
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    client: reqwest::Client,
    url: String,
}

impl HttpListingSource {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RemoteSource for HttpListingSource {
    type Output = Vec<Value>;

    async fn fetch(&self) -> Result<Vec<Value>, BoxError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(format!("Listing returned status: {}", response.status()).into());
        }

        let items: Vec<Value> = response.json().await?;
        tracing::debug!(url = %self.url, items = items.len(), "Listing fetched");
        Ok(items)
    }
}
