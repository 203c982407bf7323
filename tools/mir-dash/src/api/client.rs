//! HTTP client for a replica status server.

use std::time::Duration;

use async_trait::async_trait;
use mir_status_types::{decode_status, NodeId, NodeSnapshot, SnapshotError};
use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tracing::{debug, info};

use super::{CommandDispatcher, StatusProvider};

/// Errors that can occur when talking to the status server.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{route} returned HTTP {status}")]
    Status { route: String, status: u16 },
    #[error("Failed to decode status: {0}")]
    Decode(#[from] SnapshotError),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for `GET /status` and the per-node command routes.
pub struct StatusClient {
    client: Client,
    base_url: String,
}

impl StatusClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(ApiError::Http)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn node_route(node: NodeId, command: &str) -> String {
        format!("/node/{node}/{command}")
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, route: &str, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connection(format!("Cannot connect to {}", self.base_url))
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                route: route.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn get(&self, route: &str) -> ApiResult<Vec<u8>> {
        let request = self.client.get(self.url(route));
        self.send(route, request).await
    }
}

#[async_trait]
impl StatusProvider for StatusClient {
    async fn fetch_status(&self) -> ApiResult<Vec<NodeSnapshot>> {
        let body = self.get("/status").await?;
        let nodes = decode_status(&body)?;
        debug!(nodes = nodes.len(), bytes = body.len(), "Fetched status");
        Ok(nodes)
    }
}

#[async_trait]
impl CommandDispatcher for StatusClient {
    async fn process(&self, node: NodeId) -> ApiResult<()> {
        self.get(&Self::node_route(node, "process")).await?;
        info!(node, "Processed node actions");
        Ok(())
    }

    async fn propose(&self, node: NodeId, payload: Vec<u8>) -> ApiResult<()> {
        let route = Self::node_route(node, "propose");
        let len = payload.len();
        let request = self.client.post(self.url(&route)).body(payload);
        self.send(&route, request).await?;
        info!(node, bytes = len, "Proposed request");
        Ok(())
    }

    async fn tick(&self, node: NodeId) -> ApiResult<()> {
        self.get(&Self::node_route(node, "tick")).await?;
        debug!(node, "Ticked node");
        Ok(())
    }
}
