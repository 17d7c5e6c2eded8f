// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use super::{
    EventPublisher, FaultLogger, PublisherService, StateStore, StateStoreService,
    TracingFaultLogger,
};
use crate::{
    client::{PubSubClient, StateClient},
    outcome::Outcome,
};

/// Both capabilities behind one value, for callers that need publish and state.
#[derive(Clone)]
pub struct DaprService {
    publisher: PublisherService,
    state_store: StateStoreService,
}

impl DaprService {
    pub fn new<C>(client: Arc<C>, logger: Arc<dyn FaultLogger>) -> Self
    where
        C: PubSubClient + StateClient + 'static,
    {
        Self {
            publisher: PublisherService::new(client.clone(), logger.clone()),
            state_store: StateStoreService::new(client, logger),
        }
    }

    pub fn with_default_logger<C>(client: Arc<C>) -> Self
    where
        C: PubSubClient + StateClient + 'static,
    {
        Self::new(client, Arc::new(TracingFaultLogger))
    }

    pub fn from_parts(publisher: PublisherService, state_store: StateStoreService) -> Self {
        Self {
            publisher,
            state_store,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            publisher: self.publisher.with_timeout(timeout),
            state_store: self.state_store.with_timeout(timeout),
        }
    }

    pub fn publisher(&self) -> &PublisherService {
        &self.publisher
    }

    pub fn state_store(&self) -> &StateStoreService {
        &self.state_store
    }
}

#[async_trait]
impl EventPublisher for DaprService {
    async fn publish<T>(&self, pubsub_name: &str, topic_name: &str, payload: &T) -> Outcome<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.publisher.publish(pubsub_name, topic_name, payload).await
    }
}

#[async_trait]
impl StateStore for DaprService {
    async fn set<T>(&self, store_name: &str, key: &str, value: &T) -> Outcome<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.state_store.set(store_name, key, value).await
    }

    async fn get<T>(&self, store_name: &str, key: &str) -> Outcome<T>
    where
        T: DeserializeOwned + Send,
    {
        self.state_store.get(store_name, key).await
    }

    async fn delete(&self, store_name: &str, key: &str) -> Outcome<()> {
        self.state_store.delete(store_name, key).await
    }
}
