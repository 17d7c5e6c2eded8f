// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

mod boundary;
mod dapr;
mod publisher;
mod state_store;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::outcome::Outcome;

pub use self::dapr::DaprService;
pub use self::publisher::{PUBLISHER_ERROR_MESSAGE, PublisherService};
pub use self::state_store::{STATE_STORE_ERROR_MESSAGE, StateStoreService, not_found_message};

/// Sink for faults caught at a service boundary.
pub trait FaultLogger: Send + Sync {
    fn log_fault(&self, fault: &anyhow::Error, message: &str);
}

/// Emits one `tracing` error event per fault.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultLogger;

impl FaultLogger for TracingFaultLogger {
    fn log_fault(&self, fault: &anyhow::Error, message: &str) {
        tracing::error!(error = %format!("{:#}", fault), "{}", message);
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish<T>(&self, pubsub_name: &str, topic_name: &str, payload: &T) -> Outcome<()>
    where
        T: Serialize + Sync + ?Sized;
}

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn set<T>(&self, store_name: &str, key: &str, value: &T) -> Outcome<()>
    where
        T: Serialize + Sync + ?Sized;

    /// A missing value is reported as a `NotFound` failure.
    async fn get<T>(&self, store_name: &str, key: &str) -> Outcome<T>
    where
        T: DeserializeOwned + Send;

    async fn delete(&self, store_name: &str, key: &str) -> Outcome<()>;
}
