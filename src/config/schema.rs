//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lifecycle::Signal;
use crate::registry::TlsFiles;

/// Root configuration for the supervisor binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Signals that trigger the shutdown.
    pub signals: Vec<Signal>,

    /// Grace period for each listener's graceful stop, in seconds.
    /// Absent means wait for listeners to drain.
    pub shutdown_timeout_secs: Option<u64>,

    /// HTTP listeners to run.
    pub listeners: Vec<ListenerConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            signals: Signal::DEFAULT.to_vec(),
            shutdown_timeout_secs: None,
            listeners: vec![ListenerConfig::default()],
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SupervisorConfig {
    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_secs.map(Duration::from_secs)
    }
}

/// One HTTP listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Name reported by the listener's root route.
    pub name: String,

    /// Bind address (e.g., "0.0.0.0:8080" or ":8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for a listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    #[serde(default)]
    pub cert_path: String,

    /// Path to private key file (PEM).
    #[serde(default)]
    pub key_path: String,
}

impl TlsConfig {
    pub fn files(&self) -> TlsFiles {
        TlsFiles::new(PathBuf::from(&self.cert_path), PathBuf::from(&self.key_path))
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
