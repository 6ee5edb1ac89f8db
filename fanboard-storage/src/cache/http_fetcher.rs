//! Fetcher that retrieves documents over HTTP(S).

use async_trait::async_trait;
use fanboard_core::FetchError;
use reqwest::StatusCode;

use super::resource_key::ResourceKey;
use super::traits::ResourceFetcher;

/// GETs each location relative to a base URL.
///
/// Locations that are already absolute URLs (for templates like
/// `https://cdn.example.com/{key}.json`) are used unchanged.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client (proxy, headers, transport timeout).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a location.
    pub fn url_for(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            return location.to_string();
        }
        if location.starts_with('/') {
            format!("{}{}", self.base_url, location)
        } else {
            format!("{}/{}", self.base_url, location)
        }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, key: &ResourceKey, location: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(location);
        let transport = |e: reqwest::Error| FetchError::Transport {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                key: key.to_string(),
                location: url,
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}
