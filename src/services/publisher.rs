// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use super::{EventPublisher, FaultLogger, TracingFaultLogger, boundary::FaultBoundary};
use crate::{client::PubSubClient, outcome::Outcome};

pub const PUBLISHER_ERROR_MESSAGE: &str = "dapr-outcome - Event publishing error";

#[derive(Clone)]
pub struct PublisherService {
    client: Arc<dyn PubSubClient>,
    boundary: FaultBoundary,
}

impl PublisherService {
    pub fn new(client: Arc<dyn PubSubClient>, logger: Arc<dyn FaultLogger>) -> Self {
        Self {
            client,
            boundary: FaultBoundary::new(logger, PUBLISHER_ERROR_MESSAGE),
        }
    }

    pub fn with_default_logger(client: Arc<dyn PubSubClient>) -> Self {
        Self::new(client, Arc::new(TracingFaultLogger))
    }

    /// Fails any publish that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.boundary.set_timeout(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.boundary.timeout()
    }
}

#[async_trait]
impl EventPublisher for PublisherService {
    async fn publish<T>(&self, pubsub_name: &str, topic_name: &str, payload: &T) -> Outcome<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.boundary
            .call(async {
                let payload =
                    serde_json::to_value(payload).context("Failed to serialize event payload")?;
                self.client
                    .publish_event(pubsub_name, topic_name, payload)
                    .await
            })
            .await
    }
}
