// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

//! Composition root: owns the sidecar config and hands out services that
//! share a single HTTP client.

use std::{sync::Arc, time::Duration};

use once_cell::sync::OnceCell;

use crate::{
    client::http::DaprHttpClient,
    config::SidecarConfig,
    services::{DaprService, FaultLogger, PublisherService, StateStoreService, TracingFaultLogger},
};

pub struct SidecarServices {
    config: SidecarConfig,
    logger: Arc<dyn FaultLogger>,
    client: OnceCell<Arc<DaprHttpClient>>,
}

impl SidecarServices {
    pub fn new(config: SidecarConfig) -> Self {
        Self {
            config,
            logger: Arc::new(TracingFaultLogger),
            client: OnceCell::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn FaultLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SidecarConfig {
        &self.config
    }

    pub fn is_client_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    /// The shared client, created on first use.
    pub fn client(&self) -> anyhow::Result<Arc<DaprHttpClient>> {
        self.client
            .get_or_try_init(|| {
                tracing::info!(endpoint = %self.config.endpoint(), "Creating sidecar client");
                DaprHttpClient::new(&self.config).map(Arc::new)
            })
            .cloned()
    }

    fn call_timeout(&self) -> Option<Duration> {
        self.config.call_timeout_ms.map(Duration::from_millis)
    }

    pub fn publisher(&self) -> anyhow::Result<PublisherService> {
        let service = PublisherService::new(self.client()?, self.logger.clone());
        Ok(match self.call_timeout() {
            Some(timeout) => service.with_timeout(timeout),
            None => service,
        })
    }

    pub fn state_store(&self) -> anyhow::Result<StateStoreService> {
        let service = StateStoreService::new(self.client()?, self.logger.clone());
        Ok(match self.call_timeout() {
            Some(timeout) => service.with_timeout(timeout),
            None => service,
        })
    }

    pub fn dapr(&self) -> anyhow::Result<DaprService> {
        Ok(DaprService::from_parts(self.publisher()?, self.state_store()?))
    }
}
