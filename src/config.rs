// src/config.rs

//! Client configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the client.
//! Every value has a default, so a bare environment yields a client
//! pointed at a local backend. Values are resolved exactly once; nothing
//! downstream re-reads the environment per request.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional string variable, treating blank values as unset.
macro_rules! optional_env_string {
    // ---
    ($key:literal, $default:expr) => {
        std::env::var($key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| $default.to_string())
    };
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated client configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

impl ClientConfig {
    /// Loads all client configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if a configured value is present but unusable
    /// (for example a base URL without a scheme).
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            api: api::ApiConfig::from_env()?,
            storage: storage::StorageConfig::from_env(),
            metrics: metrics::MetricsConfig::from_env(),
        })
    }
}

// ============================================================
// Backend API configuration
// ============================================================

mod api {
    // ---
    use super::*;

    /// Fallback backend address used when `ECORG_API_URL` is unset.
    pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

    /// Namespace every resource path lives under.
    pub const API_NAMESPACE: &str = "api";

    /// Where the backend lives and how long to wait for it.
    #[derive(Debug, Clone)]
    pub struct ApiConfig {
        /// Backend base URL without trailing slashes. Defaults to `http://localhost:4000`.
        pub base_url: String,

        /// Upper bound for a single request. Defaults to 15 seconds.
        pub timeout: Duration,
    }

    impl ApiConfig {
        /// Builds an [`ApiConfig`] for an explicit base URL with the default timeout.
        pub fn new(base_url: impl Into<String>) -> Self {
            // ---
            Self {
                base_url: trim_base_url(&base_url.into()),
                timeout: Duration::from_secs(15),
            }
        }

        /// Builds an [`ApiConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `ECORG_API_URL` is set to something that is
        /// not an http(s) URL.
        pub fn from_env() -> Result<Self> {
            // ---
            let raw = optional_env_string!("ECORG_API_URL", DEFAULT_BASE_URL);
            let timeout_secs = optional_env_parse!("ECORG_API_TIMEOUT_SEC", u64, 15);

            let base_url = trim_base_url(&raw);
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                anyhow::bail!("ECORG_API_URL must be an http(s) URL, got {base_url:?}");
            }

            Ok(Self {
                base_url,
                timeout: Duration::from_secs(timeout_secs.max(1)),
            })
        }

        /// Root of the REST namespace, e.g. `http://localhost:4000/api/`.
        ///
        /// The trailing slash matters: resource paths are joined onto it.
        pub fn api_root(&self) -> String {
            // ---
            format!("{}/{}/", self.base_url, API_NAMESPACE)
        }
    }

    fn trim_base_url(raw: &str) -> String {
        raw.trim().trim_end_matches('/').to_string()
    }
}
pub use api::{ApiConfig, DEFAULT_BASE_URL};

// ============================================================
// Credential storage configuration
// ============================================================

mod storage {
    // ---
    use super::*;

    /// Fixed namespace key the credential is stored under.
    pub const CREDENTIAL_KEY: &str = "ecorg_token";

    /// Location of durable client state.
    #[derive(Debug, Clone)]
    pub struct StorageConfig {
        /// Directory holding the credential file. Defaults to `.ecorg`.
        pub state_dir: PathBuf,
    }

    impl StorageConfig {
        pub fn from_env() -> Self {
            // ---
            let dir = optional_env_string!("ECORG_STATE_DIR", ".ecorg");
            Self {
                state_dir: PathBuf::from(dir),
            }
        }

        /// Full path of the credential file.
        pub fn credential_path(&self) -> PathBuf {
            // ---
            self.state_dir.join(CREDENTIAL_KEY)
        }
    }
}
pub use storage::{StorageConfig, CREDENTIAL_KEY};

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---

    /// Which metrics backend to install.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsKind {
        Noop,
        Prometheus,
    }

    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        pub kind: MetricsKind,
    }

    impl MetricsConfig {
        /// `ECORG_METRICS_TYPE=prom` selects Prometheus; anything else is no-op.
        pub fn from_env() -> Self {
            // ---
            let kind = match std::env::var("ECORG_METRICS_TYPE").as_deref() {
                Ok("prom") => MetricsKind::Prometheus,
                _ => MetricsKind::Noop,
            };
            Self { kind }
        }
    }
}
pub use metrics::{MetricsConfig, MetricsKind};

// ============================================================
// Tests
// ============================================================
