use crate::core::{BoundingBox, PointRecord, PointStore, StoreSession};
use crate::utils::error::{ProximityError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Query parameter names carrying the four bounds of a range query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParams {
    pub min_lat: String,
    pub max_lat: String,
    pub min_lon: String,
    pub max_lon: String,
}

impl Default for BoundParams {
    fn default() -> Self {
        Self {
            min_lat: "min_lat".to_string(),
            max_lat: "max_lat".to_string(),
            min_lon: "min_lon".to_string(),
            max_lon: "max_lon".to_string(),
        }
    }
}

impl BoundParams {
    fn pairs<'a>(&'a self, bounds: &BoundingBox) -> [(&'a str, f64); 4] {
        [
            (self.min_lat.as_str(), bounds.min_lat),
            (self.max_lat.as_str(), bounds.max_lat),
            (self.min_lon.as_str(), bounds.min_lon),
            (self.max_lon.as_str(), bounds.max_lon),
        ]
    }
}

/// Point store reached over HTTP. The endpoint receives the four bounds as
/// query parameters (named by [`BoundParams`]) and answers with a JSON array
/// of point objects.
#[derive(Debug, Clone)]
pub struct HttpPointStore {
    client: Client,
    endpoint: String,
    params: BoundParams,
}

impl HttpPointStore {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProximityError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            params: BoundParams::default(),
        }
    }

    pub fn with_params(mut self, params: BoundParams) -> Self {
        self.params = params;
        self
    }
}

impl PointStore for HttpPointStore {
    type Session = HttpSession;

    async fn acquire(&self) -> Result<Self::Session> {
        // the client pools connections; a session borrows one for a single request
        Ok(HttpSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            params: self.params.clone(),
        })
    }
}

pub struct HttpSession {
    client: Client,
    endpoint: String,
    params: BoundParams,
}

#[async_trait]
impl StoreSession for HttpSession {
    async fn range_query(&mut self, bounds: &BoundingBox) -> Result<Vec<PointRecord>> {
        tracing::debug!("Making range query request to: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.params.pairs(bounds))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::debug!("Range query response status: {}", status);
        if !status.is_success() {
            return Err(ProximityError::storage(format!(
                "range query endpoint returned {}",
                status
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(transport_error)?;
        match body {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Object(data) => Ok(PointRecord::new(data)),
                    other => Err(ProximityError::storage(format!(
                        "range query returned a non-object entry: {}",
                        other
                    ))),
                })
                .collect(),
            _ => Err(ProximityError::storage(
                "range query response must be a JSON array",
            )),
        }
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        tracing::trace!("Released HTTP store session for {}", self.endpoint);
    }
}

fn transport_error(e: reqwest::Error) -> ProximityError {
    if e.is_timeout() {
        ProximityError::storage(format!("range query timed out: {}", e))
    } else if e.is_decode() {
        ProximityError::storage(format!("range query returned invalid JSON: {}", e))
    } else {
        ProximityError::storage(format!("range query endpoint unreachable: {}", e))
    }
}
