pub mod client;
pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod outcome;
pub mod protocol;
pub mod registration;
pub mod services;

// Re-export commonly used types
pub use client::{PubSubClient, StateClient, http::DaprHttpClient, memory::InMemorySidecar};
pub use config::SidecarConfig;
pub use outcome::{Failure, FailureKind, Outcome};
pub use registration::SidecarServices;
pub use services::{
    DaprService, EventPublisher, FaultLogger, PublisherService, StateStore, StateStoreService,
    TracingFaultLogger,
};
