// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::{PubSubClient, StateClient};

type StoreName = String;
type StateKey = String;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub pubsub_name: String,
    pub topic_name: String,
    pub payload: Value,
}

/// Process-local stand-in for the sidecar. Publishing only records the event;
/// nothing is delivered.
#[derive(Default)]
pub struct InMemorySidecar {
    stores: RwLock<HashMap<StoreName, HashMap<StateKey, Value>>>,
    published: RwLock<Vec<PublishedEvent>>,
}

impl InMemorySidecar {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn published(&self) -> Vec<PublishedEvent> {
        self.published.read().await.clone()
    }

    pub async fn published_to(&self, topic_name: &str) -> Vec<PublishedEvent> {
        self.published
            .read()
            .await
            .iter()
            .filter(|event| event.topic_name == topic_name)
            .cloned()
            .collect()
    }

    pub async fn keys(&self, store_name: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .stores
            .read()
            .await
            .get(store_name)
            .map(|store| store.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl PubSubClient for InMemorySidecar {
    async fn publish_event(
        &self,
        pubsub_name: &str,
        topic_name: &str,
        payload: Value,
    ) -> anyhow::Result<()> {
        tracing::debug!(pubsub = %pubsub_name, topic = %topic_name, "Recording published event");
        self.published.write().await.push(PublishedEvent {
            pubsub_name: pubsub_name.to_string(),
            topic_name: topic_name.to_string(),
            payload,
        });
        Ok(())
    }
}

#[async_trait]
impl StateClient for InMemorySidecar {
    async fn save_state(&self, store_name: &str, key: &str, value: Value) -> anyhow::Result<()> {
        self.stores
            .write()
            .await
            .entry(store_name.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get_state(&self, store_name: &str, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self
            .stores
            .read()
            .await
            .get(store_name)
            .and_then(|store| store.get(key))
            .cloned())
    }

    async fn delete_state(&self, store_name: &str, key: &str) -> anyhow::Result<()> {
        let mut stores = self.stores.write().await;

        if let Some(mut store) = stores.remove(store_name) {
            store.remove(key);

            if !store.is_empty() {
                stores.insert(store_name.to_string(), store);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let sidecar = InMemorySidecar::new();
        let data = json!({ "amount": 42 });

        sidecar
            .save_state("orders", "o-1", data.clone())
            .await
            .unwrap();
        assert_eq!(
            sidecar.get_state("orders", "o-1").await.unwrap(),
            Some(data)
        );

        sidecar.delete_state("orders", "o-1").await.unwrap();
        assert_eq!(sidecar.get_state("orders", "o-1").await.unwrap(), None);
        assert!(sidecar.keys("orders").await.is_empty());
    }

    #[tokio::test]
    async fn stores_are_isolated_by_name() {
        let sidecar = InMemorySidecar::new();

        sidecar.save_state("orders", "k", json!(1)).await.unwrap();
        sidecar.save_state("carts", "k", json!(2)).await.unwrap();

        let orders = sidecar.get_state("orders", "k").await.unwrap();
        let carts = sidecar.get_state("carts", "k").await.unwrap();
        assert_eq!(orders, Some(json!(1)));
        assert_eq!(carts, Some(json!(2)));

        sidecar.delete_state("orders", "k").await.unwrap();
        let carts = sidecar.get_state("carts", "k").await.unwrap();
        assert_eq!(carts, Some(json!(2)));
    }

    #[tokio::test]
    async fn delete_keeps_other_keys_in_store() {
        let sidecar = InMemorySidecar::new();

        sidecar.save_state("orders", "o-1", json!(1)).await.unwrap();
        sidecar.save_state("orders", "o-2", json!(2)).await.unwrap();
        sidecar.delete_state("orders", "o-1").await.unwrap();
        sidecar.delete_state("orders", "o-1").await.unwrap();
        sidecar.delete_state("unknown", "o-1").await.unwrap();

        assert_eq!(sidecar.keys("orders").await, vec!["o-2".to_string()]);
    }

    #[tokio::test]
    async fn publish_records_events_in_order() {
        let sidecar = InMemorySidecar::new();

        sidecar
            .publish_event("events", "order-created", json!({ "id": "o-1" }))
            .await
            .unwrap();
        sidecar
            .publish_event("events", "order-paid", json!({ "id": "o-1" }))
            .await
            .unwrap();

        let published = sidecar.published().await;
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].topic_name, "order-created");
        assert_eq!(published[1].topic_name, "order-paid");

        let paid = sidecar.published_to("order-paid").await;
        assert_eq!(
            paid,
            vec![PublishedEvent {
                pubsub_name: "events".to_string(),
                topic_name: "order-paid".to_string(),
                payload: json!({ "id": "o-1" }),
            }]
        );
    }
}
