use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::WallpaperSearcher;

const SEARCH_ENDPOINT: &str = "https://wallhaven.cc/api/v1/search";

/// Wallpaper search backed by the Wallhaven API.
#[derive(Debug, Clone)]
pub struct WallhavenClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    path: String,
}

impl WallhavenClient {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: SEARCH_ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl WallpaperSearcher for WallhavenClient {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}?q={}&sorting=random&categories=111&purity=100&atleast=1920x1080&ratios=16x9",
            self.endpoint,
            urlencoding::encode(query)
        );
        debug!("Searching wallpapers for '{}'", query);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "wallpaper search for '{}' failed with status {}",
                query,
                response.status()
            ));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.data.into_iter().map(|hit| hit.path).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_shape() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"data": [{"path": "https://w.wallhaven.cc/full/ab/wallhaven-ab1234.jpg", "id": "ab1234"}]}"#,
        )
        .unwrap();
        assert_eq!(body.data.len(), 1);
        assert!(body.data[0].path.ends_with("ab1234.jpg"));
    }

    #[test]
    fn test_empty_result_set() {
        let body: SearchResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = WallhavenClient::new(1).with_endpoint("http://127.0.0.1:1/search".to_string());
        assert!(client.search("rainy").await.is_err());
    }
}
