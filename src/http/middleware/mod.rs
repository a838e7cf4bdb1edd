//! Axum middleware applied around the proxy handler.

pub mod cors;
