use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ClientError;

/// Looks up proj4 definitions for EPSG codes missing from the local table.
#[async_trait(?Send)]
pub trait ProjectionResolver {
    /// `Ok(None)` means the registry answered but knows no such code.
    async fn resolve(&self, epsg: &str) -> Result<Option<String>, ClientError>;
}

pub const EPSG_IO_URL: &str = "https://epsg.io/";

/// The epsg.io search API.
#[derive(Debug, Clone)]
pub struct EpsgIoResolver {
    http: reqwest::Client,
    base_url: String,
}

impl Default for EpsgIoResolver {
    fn default() -> Self {
        Self::new(EPSG_IO_URL)
    }
}

impl EpsgIoResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    proj4: Option<String>,
}

fn first_proj4(body: &str) -> Result<Option<String>, ClientError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| ClientError::decode("epsg.io search", e))?;
    Ok(parsed
        .results
        .into_iter()
        .find_map(|r| r.proj4.filter(|p| !p.trim().is_empty())))
}

#[async_trait(?Send)]
impl ProjectionResolver for EpsgIoResolver {
    async fn resolve(&self, epsg: &str) -> Result<Option<String>, ClientError> {
        let op = "epsg.io search";
        debug!("resolving EPSG:{epsg} via {}", self.base_url);
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("format", "json"), ("q", epsg)])
            .send()
            .await
            .map_err(|source| ClientError::Http {
                operation: op.to_string(),
                source,
            })?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                operation: op.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let body = resp.text().await.map_err(|source| ClientError::Http {
            operation: op.to_string(),
            source,
        })?;
        first_proj4(&body)
    }
}
