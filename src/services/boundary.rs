// Copyright Motia LLC and/or licensed to Motia LLC under one or more
// contributor license agreements. Licensed under the Elastic License 2.0;
// you may not use this file except in compliance with the Elastic License 2.0.
// This software is patent protected. We welcome discussions - reach out at support@motia.dev
// See LICENSE and PATENTS files for details.

use std::{future::Future, sync::Arc, time::Duration};

use super::FaultLogger;
use crate::{
    diagnostics::extract_fault_messages,
    outcome::{Failure, FailureKind, Outcome},
};

/// Converts port results into outcomes for one service.
///
/// Every fault is logged once under `message`, which also leads the failure's
/// message list.
#[derive(Clone)]
pub(crate) struct FaultBoundary {
    logger: Arc<dyn FaultLogger>,
    message: &'static str,
    timeout: Option<Duration>,
}

impl FaultBoundary {
    pub(crate) fn new(logger: Arc<dyn FaultLogger>, message: &'static str) -> Self {
        Self {
            logger,
            message,
            timeout: None,
        }
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) async fn call<T, F>(&self, call: F) -> Outcome<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let result = match self.timeout {
            // dropping the pending call cancels it
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "operation timed out after {} ms",
                    limit.as_millis()
                )),
            },
            None => call.await,
        };

        match result {
            Ok(value) => Outcome::Ok(value),
            Err(fault) => Outcome::Failure(self.failure(fault)),
        }
    }

    pub(crate) fn failure(&self, fault: anyhow::Error) -> Failure {
        self.logger.log_fault(&fault, self.message);
        Failure::with_causes(
            FailureKind::InternalError,
            self.message,
            extract_fault_messages(&fault),
        )
    }
}
