// Copyright (c) 2025 - Cowboy AI, Inc.

//! Instance Metadata Service (IMDS) Identity Adapter
//!
//! Resolves the current instance's identity from the link-local metadata
//! endpoint:
//!
//! ```text
//! PUT /latest/api/token                         → session token (IMDSv2)
//! GET /latest/meta-data/instance-id             → i-0abc123
//! GET /latest/meta-data/local-ipv4              → 10.0.0.5
//! GET /latest/dynamic/instance-identity/document → {"region": "us-east-1", ...}
//! ```
//!
//! When the token endpoint is unavailable the client falls back to
//! unauthenticated IMDSv1 requests. Nothing here mutates state, so
//! resolving can be retried freely.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::IdentitySource;
use crate::domain::InstanceIdentity;
use crate::errors::{IdentityError, IdentityResult};

const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";

/// Configuration for the metadata endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImdsConfig {
    /// Base URL (e.g., "http://169.254.169.254")
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Lifetime requested for IMDSv2 session tokens
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u32,
}

fn default_timeout() -> u64 {
    2
}

fn default_token_ttl() -> u32 {
    21600
}

impl Default for ImdsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://169.254.169.254".to_string(),
            timeout_secs: default_timeout(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

/// Fields of the instance identity document this adapter reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDocument {
    region: Option<String>,
}

/// IMDS-backed [`IdentitySource`]
pub struct ImdsClient {
    config: ImdsConfig,
    client: Client,
}

impl ImdsClient {
    /// Create a new metadata client
    pub fn new(config: ImdsConfig) -> IdentityResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            // Link-local endpoint, never proxied
            .no_proxy()
            .build()
            .map_err(|e| IdentityError::Unreachable {
                endpoint: config.endpoint.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/latest/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn unreachable(&self, reason: impl ToString) -> IdentityError {
        IdentityError::Unreachable {
            endpoint: self.config.endpoint.clone(),
            reason: reason.to_string(),
        }
    }

    /// Request an IMDSv2 session token, `None` to fall back to IMDSv1
    async fn session_token(&self) -> Option<String> {
        let response = self
            .client
            .put(self.url("api/token"))
            .header(TOKEN_TTL_HEADER, self.config.token_ttl_secs.to_string())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
                _ => None,
            },
            Ok(response) => {
                debug!("IMDSv2 token request returned {}, using IMDSv1", response.status());
                None
            }
            Err(e) => {
                debug!("IMDSv2 token request failed ({}), using IMDSv1", e);
                None
            }
        }
    }

    /// Fetch a metadata path, `None` if the service does not know it
    async fn get(&self, token: Option<&str>, path: &str) -> IdentityResult<Option<String>> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(|e| self.unreachable(e))?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await.map_err(|e| self.unreachable(e))?;
                debug!("IMDS {} -> {} bytes", path, body.len());
                Ok(Some(body.trim().to_string()).filter(|body| !body.is_empty()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(self.unreachable(format!("GET {} returned {}", path, status))),
        }
    }

    async fn region(&self, token: Option<&str>) -> IdentityResult<Option<String>> {
        if let Some(document) = self.get(token, "dynamic/instance-identity/document").await? {
            let document: IdentityDocument = serde_json::from_str(&document)?;
            if let Some(region) = document.region.filter(|r| !r.is_empty()) {
                return Ok(Some(region));
            }
        }

        self.get(token, "meta-data/placement/region").await
    }
}

#[async_trait]
impl IdentitySource for ImdsClient {
    async fn resolve(&self) -> IdentityResult<InstanceIdentity> {
        debug!("Resolving instance identity from {}", self.config.endpoint);
        let token = self.session_token().await;
        let token = token.as_deref();

        let id = self
            .get(token, "meta-data/instance-id")
            .await?
            .ok_or(IdentityError::MissingField("instance-id"))?;
        let region = self
            .region(token)
            .await?
            .ok_or(IdentityError::MissingField("region"))?;
        let address = self
            .get(token, "meta-data/local-ipv4")
            .await?
            .ok_or(IdentityError::MissingField("local-ipv4"))?;

        let identity = InstanceIdentity::new(id, region, address)?;
        info!("Resolved instance identity: {}", identity);
        Ok(identity)
    }
}
