//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (or a TOML file via --config)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: GATEWAY_PORT, <NAME>_SERVICE_URL)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to the server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route rules never change at runtime
//! - All fields have defaults so the config file is optional
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{CorsConfig, GatewayConfig, ListenerConfig, RouteConfig, TimeoutConfig};
