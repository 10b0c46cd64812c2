pub mod credentials;
pub mod metrics;
pub mod notify;

// Re-export the factory functions for easy access
pub use credentials::{
    create as create_file_credentials, create_in_memory as create_memory_credentials,
};
pub use metrics::{create_noop_metrics, create_prom_metrics};
pub use notify::create as create_tracing_notifier;
