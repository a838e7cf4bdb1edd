//! CORS middleware.
//!
//! # Responsibilities
//! - Stamp the configured CORS headers onto every response leaving the
//!   gateway: proxied, 404 fallback, and error responses alike
//!
//! # Design Decisions
//! - Header values are parsed once at startup, not per request
//! - Installed as the outermost layer so nothing can answer without them
//! - Preflight OPTIONS requests are not short-circuited; they pass through
//!   to the upstream like any other method

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;
use crate::http::server::AppState;

/// Pre-parsed CORS header values, shared via application state.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsHeaders {
    /// Parse the configured values once at startup.
    pub fn from_config(config: &CorsConfig) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
        })
    }

    /// Insert the CORS headers into a response header map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            self.allow_headers.clone(),
        );
    }
}

/// Attach the configured CORS headers to the response.
pub async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    state.cors.apply(response.headers_mut());
    response
}
