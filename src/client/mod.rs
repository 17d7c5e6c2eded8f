// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

//! Ports to the sidecar. Services depend on these traits only; transport
//! lives in the implementations.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait PubSubClient: Send + Sync {
    async fn publish_event(
        &self,
        pubsub_name: &str,
        topic_name: &str,
        payload: Value,
    ) -> anyhow::Result<()>;
}

#[async_trait]
pub trait StateClient: Send + Sync {
    async fn save_state(&self, store_name: &str, key: &str, value: Value) -> anyhow::Result<()>;
    /// `Ok(None)` when the store holds no value for `key`.
    async fn get_state(&self, store_name: &str, key: &str) -> anyhow::Result<Option<Value>>;
    async fn delete_state(&self, store_name: &str, key: &str) -> anyhow::Result<()>;
}
