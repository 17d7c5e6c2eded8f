// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{FaultLogger, StateStore, TracingFaultLogger, boundary::FaultBoundary};
use crate::{
    client::StateClient,
    outcome::{Failure, Outcome},
};

pub const STATE_STORE_ERROR_MESSAGE: &str = "dapr-outcome - Data provider error";

pub fn not_found_message(store_name: &str, key: &str) -> String {
    format!("State from the store {store_name} with the {key} not found.")
}

#[derive(Clone)]
pub struct StateStoreService {
    client: Arc<dyn StateClient>,
    boundary: FaultBoundary,
}

impl StateStoreService {
    pub fn new(client: Arc<dyn StateClient>, logger: Arc<dyn FaultLogger>) -> Self {
        Self {
            client,
            boundary: FaultBoundary::new(logger, STATE_STORE_ERROR_MESSAGE),
        }
    }

    pub fn with_default_logger(client: Arc<dyn StateClient>) -> Self {
        Self::new(client, Arc::new(TracingFaultLogger))
    }

    /// Fails any state call that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.boundary.set_timeout(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.boundary.timeout()
    }
}

#[async_trait]
impl StateStore for StateStoreService {
    async fn set<T>(&self, store_name: &str, key: &str, value: &T) -> Outcome<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.boundary
            .call(async {
                let value = serde_json::to_value(value)
                    .with_context(|| format!("Failed to serialize state {}", key))?;
                self.client.save_state(store_name, key, value).await
            })
            .await
    }

    async fn get<T>(&self, store_name: &str, key: &str) -> Outcome<T>
    where
        T: DeserializeOwned + Send,
    {
        let found = match self.boundary.call(self.client.get_state(store_name, key)).await {
            Outcome::Ok(found) => found,
            Outcome::Failure(failure) => return Outcome::Failure(failure),
        };

        // a stored JSON null reads back as absent
        let value = match found {
            Some(Value::Null) | None => {
                tracing::debug!(store = %store_name, key = %key, "State not found");
                return Outcome::Failure(Failure::not_found(not_found_message(store_name, key)));
            }
            Some(value) => value,
        };

        match serde_json::from_value(value) {
            Ok(value) => Outcome::Ok(value),
            Err(err) => Outcome::Failure(self.boundary.failure(
                anyhow::Error::new(err).context(format!(
                    "Failed to deserialize state {} from the store {}",
                    key, store_name
                )),
            )),
        }
    }

    async fn delete(&self, store_name: &str, key: &str) -> Outcome<()> {
        self.boundary
            .call(self.client.delete_state(store_name, key))
            .await
    }
}
