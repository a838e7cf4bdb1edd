//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route rules (prefixes, targets, duplicates)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("no routes configured")]
    NoRoutes,

    #[error("route with prefix '{prefix}' has an empty name")]
    EmptyRouteName { prefix: String },

    #[error("route '{route}': prefix '{prefix}' must start with '/'")]
    InvalidPrefix { route: String, prefix: String },

    #[error("duplicate route prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },

    #[error("route '{route}': invalid target '{target}': {reason}")]
    InvalidTarget {
        route: String,
        target: String,
        reason: String,
    },

    #[error("timeouts must be greater than zero")]
    ZeroTimeout,

    #[error("CORS value for '{field}' is not a valid header value")]
    InvalidCorsValue { field: &'static str },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen_prefixes = HashSet::new();
    for route in &config.routes {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyRouteName {
                prefix: route.prefix.clone(),
            });
        }

        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                route: route.name.clone(),
                prefix: route.prefix.clone(),
            });
        }

        // Shadowing by an earlier, shorter prefix is legal (declaration order
        // is the tie-break); an exact duplicate can never be reached.
        if !seen_prefixes.insert(route.prefix.clone()) {
            errors.push(ValidationError::DuplicatePrefix {
                prefix: route.prefix.clone(),
            });
        }

        match Url::parse(&route.target) {
            Ok(url) => {
                if url.scheme() != "http" {
                    errors.push(ValidationError::InvalidTarget {
                        route: route.name.clone(),
                        target: route.target.clone(),
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    });
                } else if url.host_str().is_none() {
                    errors.push(ValidationError::InvalidTarget {
                        route: route.name.clone(),
                        target: route.target.clone(),
                        reason: "missing host".to_string(),
                    });
                }
            }
            Err(error) => {
                errors.push(ValidationError::InvalidTarget {
                    route: route.name.clone(),
                    target: route.target.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    if config.timeouts.connect_secs == 0 || config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let cors_fields = [
        ("allow_origin", &config.cors.allow_origin),
        ("allow_methods", &config.cors.allow_methods),
        ("allow_headers", &config.cors.allow_headers),
    ];
    for (field, value) in cors_fields {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidCorsValue { field });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
