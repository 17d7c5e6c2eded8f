// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::io::ErrorKind;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HTTP_PORT: u16 = 3500;

pub const ENV_HTTP_ENDPOINT: &str = "DAPR_HTTP_ENDPOINT";
pub const ENV_HTTP_PORT: &str = "DAPR_HTTP_PORT";
pub const ENV_API_TOKEN: &str = "DAPR_API_TOKEN";

fn default_timeout_ms() -> u64 {
    30000
}

fn default_pool_max_idle_per_host() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SidecarConfig {
    /// Base URL of the sidecar HTTP API. Falls back to the environment, then
    /// to `http://127.0.0.1:3500`.
    #[serde(default)]
    pub http_endpoint: Option<String>,

    #[serde(default)]
    pub api_token: Option<String>,

    /// Transport timeout applied by the HTTP client to every request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Optional deadline enforced by the services around each call.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            http_endpoint: None,
            api_token: None,
            timeout_ms: default_timeout_ms(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            call_timeout_ms: None,
        }
    }
}

impl SidecarConfig {
    pub fn from_yaml(yaml_content: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml_content).context("Invalid sidecar config")?;
        Ok(config)
    }

    /// Loads config from file, or returns the default if the file doesn't exist
    pub fn from_file_or_default(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(yaml_content) => {
                tracing::info!("Loading sidecar config from {}", path);
                Self::from_yaml(&yaml_content).with_context(|| format!("Failed to parse {}", path))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("No {} found, using default sidecar config", path);
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path)),
        }
    }

    /// Fills unset fields from the `DAPR_*` environment variables.
    pub fn resolve(self) -> Self {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.http_endpoint.is_none() {
            self.http_endpoint = lookup(ENV_HTTP_ENDPOINT)
                .filter(|endpoint| !endpoint.is_empty())
                .or_else(|| {
                    let port = lookup(ENV_HTTP_PORT)?;
                    match port.parse::<u16>() {
                        Ok(port) => Some(format!("http://127.0.0.1:{}", port)),
                        Err(_) => {
                            tracing::warn!(port = %port, "Ignoring invalid {}", ENV_HTTP_PORT);
                            None
                        }
                    }
                });
        }

        if self.api_token.is_none() {
            self.api_token = lookup(ENV_API_TOKEN).filter(|token| !token.is_empty());
        }

        self
    }

    pub fn endpoint(&self) -> String {
        self.http_endpoint
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", DEFAULT_HTTP_PORT))
    }
}
