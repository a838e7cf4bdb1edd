//! HTTP gateway for a books-catalog microservices deployment.
//!
//! A single listener classifies each inbound request by path prefix and
//! forwards it unmodified to the configured upstream service. No matching
//! prefix means 404; an unreachable upstream means 502. Every response
//! carries the configured CORS headers.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                   GATEWAY                      │
//!                     │                                                │
//!     Client Request  │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!     ────────────────┼─▶│  http   │───▶│ routing  │───▶│ upstream │──┼──▶ auth service
//!                     │  │ server  │    │  table   │    │  client  │  │
//!     Client Response │  └─────────┘    └──────────┘    └──────────┘──┼──▶ book service
//!     ◀───────────────┼───────────────────────────────────────────────┤
//!                     │                                                │
//!                     │  ┌──────────────────────────────────────────┐  │
//!                     │  │           Cross-Cutting Concerns          │  │
//!                     │  │  ┌────────┐ ┌───────────┐ ┌────────────┐ │  │
//!                     │  │  │ config │ │ lifecycle │ │observability│ │  │
//!                     │  │  └────────┘ └───────────┘ └────────────┘ │  │
//!                     │  └──────────────────────────────────────────┘  │
//!                     └───────────────────────────────────────────────┘
//! ```
//!
//! The gateway is deliberately a dumb pass-through: one attempt per
//! request, no retries, no load balancing, no circuit breaking. Failures
//! surface to the caller immediately as plain HTTP error responses.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
