//! Configuration loading from disk and the environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: String, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, reason } => write!(f, "Invalid {}: {}", var, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override, and validate the gateway configuration.
///
/// Without a `path` the built-in defaults apply. Environment overrides are
/// applied after the file is read, so they win in either case.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `GATEWAY_PORT` and per-route `<NAME>_SERVICE_URL` overrides.
///
/// The default rule set answers to `AUTH_SERVICE_URL` and `BOOKS_SERVICE_URL`
/// this way; renamed or additional routes get a matching variable for free.
fn apply_env_overrides(config: &mut GatewayConfig) -> Result<(), ConfigError> {
    if let Ok(value) = env::var("GATEWAY_PORT") {
        let port: u16 = value.parse().map_err(|_| ConfigError::Env {
            var: "GATEWAY_PORT".to_string(),
            reason: format!("'{}' is not a valid port number", value),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    for route in &mut config.routes {
        let var = format!("{}_SERVICE_URL", route.name.to_uppercase());
        if let Ok(target) = env::var(&var) {
            route.target = target;
        }
    }

    Ok(())
}
