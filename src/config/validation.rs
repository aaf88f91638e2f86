//! Configuration validation.
//!
//! # Responsibilities
//! - Bind addresses parse and are not shared between listeners
//! - TLS listeners name both a certificate and a key
//! - Metrics address parses when metrics are enabled
//!
//! Returns every problem found, not just the first.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::SupervisorConfig;
use crate::net::parse_bind_address;

/// A semantic problem in a parsed config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener {name:?}: invalid bind address {address:?}")]
    InvalidBindAddress { name: String, address: String },

    #[error("listener {name:?}: bind address {address:?} already used")]
    DuplicateBindAddress { name: String, address: String },

    #[error("listener {name:?}: TLS requires both cert_path and key_path")]
    PartialTls { name: String },

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &SupervisorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for listener in &config.listeners {
        match parse_bind_address(&listener.bind_address) {
            Ok(addr) => {
                if !seen.insert(addr) {
                    errors.push(ValidationError::DuplicateBindAddress {
                        name: listener.name.clone(),
                        address: listener.bind_address.clone(),
                    });
                }
            }
            Err(_) => errors.push(ValidationError::InvalidBindAddress {
                name: listener.name.clone(),
                address: listener.bind_address.clone(),
            }),
        }

        if let Some(tls) = &listener.tls {
            if !tls.files().is_complete() {
                errors.push(ValidationError::PartialTls {
                    name: listener.name.clone(),
                });
            }
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled && parse_bind_address(&observability.metrics_address).is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ListenerConfig, TlsConfig};

    fn listener(name: &str, addr: &str) -> ListenerConfig {
        ListenerConfig {
            name: name.to_string(),
            bind_address: addr.to_string(),
            tls: None,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&SupervisorConfig::default()).is_ok());
    }

    #[test]
    fn detects_duplicate_addresses() {
        let config = SupervisorConfig {
            listeners: vec![listener("a", ":8080"), listener("b", "0.0.0.0:8080")],
            ..SupervisorConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateBindAddress {
                name: "b".to_string(),
                address: "0.0.0.0:8080".to_string(),
            }]
        );
    }

    #[test]
    fn reports_every_problem() {
        let mut tls = listener("secure", ":8443");
        tls.tls = Some(TlsConfig {
            cert_path: String::new(),
            key_path: "key.pem".to_string(),
        });
        let mut config = SupervisorConfig {
            listeners: vec![listener("bad", "localhost"), tls],
            ..SupervisorConfig::default()
        };
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "metrics".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::PartialTls {
            name: "secure".to_string()
        }));
    }
}
