// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::{fmt, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use crate::{
    client::{PubSubClient, StateClient},
    config::SidecarConfig,
    protocol::{API_TOKEN_HEADER, SaveStateItem, SidecarErrorBody},
};

const API_VERSION: &str = "v1.0";

const PUBLISH: &str = "publish";
const SAVE_STATE: &str = "save state";
const GET_STATE: &str = "get state";
const DELETE_STATE: &str = "delete state";
const HEALTH: &str = "health check";

#[derive(Debug)]
pub enum SidecarError {
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },
    Status {
        operation: &'static str,
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
    },
    InvalidResponse {
        operation: &'static str,
        source: serde_json::Error,
    },
}

impl SidecarError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SidecarError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for SidecarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SidecarError::Request { operation, .. } => {
                write!(f, "{} request to the sidecar failed", operation)
            }
            SidecarError::Status {
                operation,
                status,
                code,
                message,
            } => {
                write!(f, "sidecar answered {} with HTTP {}", operation, status)?;
                if let Some(code) = code {
                    write!(f, " [{}]", code)?;
                }
                if let Some(message) = message {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
            SidecarError::InvalidResponse { operation, .. } => {
                write!(f, "sidecar returned an unreadable {} response", operation)
            }
        }
    }
}

impl std::error::Error for SidecarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SidecarError::Request { source, .. } => Some(source),
            SidecarError::InvalidResponse { source, .. } => Some(source),
            SidecarError::Status { .. } => None,
        }
    }
}

/// Talks to the sidecar's HTTP API. Implements both ports.
pub struct DaprHttpClient {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl DaprHttpClient {
    pub fn new(config: &SidecarConfig) -> anyhow::Result<Self> {
        let endpoint = config.endpoint();
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid sidecar endpoint: {}", endpoint))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("Sidecar endpoint {} cannot be used as a base URL", endpoint);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .context("Failed to build sidecar HTTP client")?;

        tracing::debug!(endpoint = %endpoint, "Sidecar HTTP client created");

        Ok(Self {
            client,
            endpoint,
            api_token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Appends percent-encoded segments to the endpoint path.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // checked in `new`: the endpoint can be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(API_VERSION).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.api_token {
            Some(token) => request.header(API_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, SidecarError> {
        let response = request
            .send()
            .await
            .map_err(|source| SidecarError::Request { operation, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SidecarError::Request { operation, source })?;

        Err(parse_error_response(operation, status, &bytes))
    }

    /// Checks that the sidecar is up and reports itself healthy.
    pub async fn health(&self) -> anyhow::Result<()> {
        let url = self.url(&["healthz"]);
        self.send(HEALTH, self.request(Method::GET, url))
            .await
            .context("Sidecar health check failed")?;
        Ok(())
    }
}

fn parse_error_response(operation: &'static str, status: StatusCode, bytes: &[u8]) -> SidecarError {
    let (code, message) = match serde_json::from_slice::<SidecarErrorBody>(bytes) {
        Ok(body) => (body.error_code, body.message),
        Err(_) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            (None, (!text.is_empty()).then_some(text))
        }
    };

    SidecarError::Status {
        operation,
        status,
        code,
        message,
    }
}

#[async_trait]
impl PubSubClient for DaprHttpClient {
    async fn publish_event(
        &self,
        pubsub_name: &str,
        topic_name: &str,
        payload: Value,
    ) -> anyhow::Result<()> {
        let url = self.url(&["publish", pubsub_name, topic_name]);
        tracing::debug!(pubsub = %pubsub_name, topic = %topic_name, "Publishing event through sidecar");

        self.send(PUBLISH, self.request(Method::POST, url).json(&payload))
            .await
            .with_context(|| format!("Failed to publish event to {}/{}", pubsub_name, topic_name))?;

        Ok(())
    }
}

#[async_trait]
impl StateClient for DaprHttpClient {
    async fn save_state(&self, store_name: &str, key: &str, value: Value) -> anyhow::Result<()> {
        let url = self.url(&["state", store_name]);
        let body = [SaveStateItem {
            key: key.to_string(),
            value,
        }];
        tracing::debug!(store = %store_name, key = %key, "Saving state through sidecar");

        self.send(SAVE_STATE, self.request(Method::POST, url).json(&body))
            .await
            .with_context(|| format!("Failed to save state {} to the store {}", key, store_name))?;

        Ok(())
    }

    async fn get_state(&self, store_name: &str, key: &str) -> anyhow::Result<Option<Value>> {
        let url = self.url(&["state", store_name, key]);
        let context = || format!("Failed to get state {} from the store {}", key, store_name);
        tracing::debug!(store = %store_name, key = %key, "Reading state through sidecar");

        let response = self
            .send(GET_STATE, self.request(Method::GET, url))
            .await
            .with_context(context)?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SidecarError::Request {
                operation: GET_STATE,
                source,
            })
            .with_context(context)?;

        if bytes.is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|source| SidecarError::InvalidResponse {
                operation: GET_STATE,
                source,
            })
            .with_context(context)?;

        Ok(Some(value))
    }

    async fn delete_state(&self, store_name: &str, key: &str) -> anyhow::Result<()> {
        let url = self.url(&["state", store_name, key]);
        tracing::debug!(store = %store_name, key = %key, "Deleting state through sidecar");

        self.send(DELETE_STATE, self.request(Method::DELETE, url))
            .await
            .with_context(|| format!("Failed to delete state {} from the store {}", key, store_name))?;

        Ok(())
    }
}
