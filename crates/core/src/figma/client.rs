//! # Figma Client
//!
//! REST client for `api.figma.com`. Every request carries the configured
//! access token and goes through the shared retry policy.

use super::node::{FileResponse, ImagesResponse, NodesResponse};
use super::{DesignDocument, DesignLocator, FigmaError, FigmaNode};
use crate::retry::{with_retry, RetryPolicy};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.figma.com/v1";

/// Produces design documents for the pipeline's fetch stage.
#[async_trait]
pub trait DesignSource: Send + Sync {
    async fn fetch(&self, locator: &DesignLocator) -> Result<DesignDocument, FigmaError>;
}

/// How the access token is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigmaAuthScheme {
    /// Personal access token in the `X-Figma-Token` header.
    #[default]
    PersonalToken,
    /// OAuth access token as `Authorization: Bearer`.
    OAuth,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct FigmaConfig {
    #[serde(skip)]
    pub access_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth_scheme: FigmaAuthScheme,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl std::fmt::Debug for FigmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FigmaConfig")
            .field("base_url", &self.base_url)
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl FigmaConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: default_base_url(),
            auth_scheme: FigmaAuthScheme::default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_auth_scheme(mut self, scheme: FigmaAuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }
}

/// Render format for [`FigmaClient::get_images`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpg,
    Svg,
    Pdf,
}

impl ImageFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
        }
    }
}

/// Canonical API form of a node id: URLs write `1-2`, the API wants `1:2`.
pub fn api_node_id(node_id: &str) -> String {
    node_id.replace('-', ":")
}

#[derive(Debug, Clone)]
pub struct FigmaClient {
    client: Client,
    config: FigmaConfig,
    retry: RetryPolicy,
}

impl FigmaClient {
    pub fn new(config: FigmaConfig) -> Result<Self, FigmaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FigmaError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth_scheme {
            FigmaAuthScheme::PersonalToken => {
                request.header("X-Figma-Token", &self.config.access_token)
            }
            FigmaAuthScheme::OAuth => request.bearer_auth(&self.config.access_token),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FigmaError> {
        let url = self.url(path);
        with_retry(&self.retry, path, || self.get_once(&url, query)).await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FigmaError> {
        let response = self
            .authorize(self.client.get(url))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FigmaError::from_status(status.as_u16(), body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| FigmaError::Decode(e.to_string()))
    }

    /// Whole file document tree.
    #[tracing::instrument(skip(self))]
    pub async fn get_file(&self, file_key: &str) -> Result<FileResponse, FigmaError> {
        self.get_json(&format!("/files/{}", file_key), &[]).await
    }

    /// Subtrees for the given node ids.
    #[tracing::instrument(skip(self))]
    pub async fn get_nodes(&self, file_key: &str, node_ids: &[String]) -> Result<NodesResponse, FigmaError> {
        let ids = node_ids
            .iter()
            .map(|id| api_node_id(id))
            .collect::<Vec<_>>()
            .join(",");
        self.get_json(&format!("/files/{}/nodes", file_key), &[("ids", ids)])
            .await
    }

    /// Render URLs for nodes, keyed by node id. Nodes that failed to render
    /// are omitted.
    #[tracing::instrument(skip(self))]
    pub async fn get_images(
        &self,
        file_key: &str,
        node_ids: &[String],
        format: ImageFormat,
        scale: f32,
    ) -> Result<BTreeMap<String, String>, FigmaError> {
        let ids = node_ids
            .iter()
            .map(|id| api_node_id(id))
            .collect::<Vec<_>>()
            .join(",");
        let response: ImagesResponse = self
            .get_json(
                &format!("/images/{}", file_key),
                &[
                    ("ids", ids),
                    ("format", format.as_str().to_string()),
                    ("scale", scale.to_string()),
                ],
            )
            .await?;

        if let Some(err) = response.err.filter(|e| !e.is_empty()) {
            return Err(FigmaError::Status {
                status: 400,
                message: err,
            });
        }
        Ok(response
            .images
            .into_iter()
            .filter_map(|(id, url)| url.map(|u| (id, u)))
            .collect())
    }

    /// Fetch the tree a locator points at and derive its design tokens.
    #[tracing::instrument(skip(self), fields(locator = %locator))]
    pub async fn fetch_design_document(&self, locator: &DesignLocator) -> Result<DesignDocument, FigmaError> {
        let (file_name, tree) = match &locator.node_id {
            Some(node_id) => {
                let response = self
                    .get_nodes(&locator.file_key, std::slice::from_ref(node_id))
                    .await?;
                let tree = select_node(&response, node_id)?;
                (response.name, tree)
            }
            None => {
                let response = self.get_file(&locator.file_key).await?;
                (response.name, response.document)
            }
        };

        let name = file_name
            .filter(|n| !n.is_empty())
            .or_else(|| Some(tree.name.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Untitled".to_string());

        let document = DesignDocument::from_tree(locator.clone(), name, tree);
        tracing::info!(
            name = %document.name,
            colors = document.colors.len(),
            fonts = document.fonts.len(),
            components = document.components.len(),
            "Fetched design document"
        );
        Ok(document)
    }
}

#[async_trait]
impl DesignSource for FigmaClient {
    async fn fetch(&self, locator: &DesignLocator) -> Result<DesignDocument, FigmaError> {
        self.fetch_design_document(locator).await
    }
}

/// The requested node's `document`, else the first node in response order.
fn select_node(response: &NodesResponse, node_id: &str) -> Result<FigmaNode, FigmaError> {
    let entry = response
        .nodes
        .get(&api_node_id(node_id))
        .or_else(|| response.nodes.get(node_id))
        .or_else(|| response.nodes.values().next())
        .filter(|entry| !entry.is_null())
        .ok_or_else(|| FigmaError::NodeNotFound(node_id.to_string()))?;

    match entry.get("document") {
        Some(document) => serde_json::from_value(document.clone())
            .map_err(|e| FigmaError::Decode(format!("node {}: {}", node_id, e))),
        None => Ok(FigmaNode::default()),
    }
}
