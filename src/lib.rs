// src/lib.rs
use anyhow::Result;

// Public exports (visible outside this module)
pub mod api;
pub mod domain;
pub mod filters;
pub mod optimistic;
pub mod screens;
pub mod session;
pub mod validation;

// Internal-only exports (sibling access within this module)
mod client;
mod config;
mod error;
mod gateway;
mod infrastructure;

// Hoist up only the public symbol(s)
pub use client::EcoRgClient;
pub use error::ApiError;
pub use gateway::{normalize_list, Gateway, ListPayload};
pub use session::{Access, Gate, Session, SessionContext, SessionError, SessionPhase};

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_file_credentials, // ---
    create_memory_credentials,
    create_noop_metrics,
    create_prom_metrics,
    create_tracing_notifier,
};
pub use infrastructure::credentials::{FileCredentialStore, MemoryCredentialStore};
pub use infrastructure::notify::{MemoryNotifier, Notice, TracingNotifier};

/// Build a client with every backend determined by environment variables.
///
/// The credential lives in a file under `ECORG_STATE_DIR`, notices go to the
/// tracing log and the metrics backend follows `ECORG_METRICS_TYPE`.
pub fn create_client() -> Result<EcoRgClient> {
    // ---
    let config = ClientConfig::from_env()?;

    let metrics = match config.metrics.kind {
        MetricsKind::Prometheus => create_prom_metrics()?,
        MetricsKind::Noop => create_noop_metrics()?,
    };

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let credentials = create_file_credentials(config.storage.credential_path());
    let notifier = create_tracing_notifier();

    let client = EcoRgClient::new(&config.api, credentials, notifier, metrics)?;
    tracing::info!("EcoRG client targeting {}", config.api.base_url);

    Ok(client)
}
