//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Dispatch requests through the route table
//! - Forward matched requests to their upstream, streaming the body
//! - Convert routing misses to 404 and upstream failures to 502

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::middleware::cors::{cors_middleware, CorsHeaders};
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::observability::metrics;
use crate::routing::{RouteError, RouteTable};

/// Error raised while building the server from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("route table: {0}")]
    Routes(#[from] RouteError),

    #[error("CORS configuration: {0}")]
    Cors(#[from] axum::http::header::InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub client: Client<HttpConnector, Body>,
    pub cors: CorsHeaders,
    pub request_timeout: Duration,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Build a server from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let table = Arc::new(RouteTable::from_config(&config.routes)?);
        let cors = CorsHeaders::from_config(&config.cors)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            table,
            client,
            cors,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// CORS is added last so it wraps everything: any response, from any
    /// layer or handler, carries the headers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state.clone())
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(state, cors_middleware))
    }

    /// Run the server on the given listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Classifies the request by path prefix and forwards it to the matched
/// upstream, or answers 404 when no rule applies.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let route = match state.table.match_path(request.uri().path()) {
        Some(route) => route,
        None => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request(&method, 404, "none", start_time);
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
    };
    let route_name = route.name().to_string();

    let (mut parts, body) = request.into_parts();
    parts.uri = match route.upstream_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(error) => {
            tracing::error!(
                request_id = %request_id,
                route = %route_name,
                error = %error,
                "Failed to build upstream URI"
            );
            metrics::record_request(&method, 502, &route_name, start_time);
            return (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response();
        }
    };
    let upstream_request = Request::from_parts(parts, body);

    // One attempt, bounded by the request timeout. Failures surface to the
    // caller immediately; the gateway never retries on the client's behalf.
    let outcome = tokio::time::timeout(
        state.request_timeout,
        state.client.request(upstream_request),
    )
    .await;

    match outcome {
        Ok(Ok(response)) => {
            let status = response.status();
            tracing::debug!(
                request_id = %request_id,
                route = %route_name,
                status = %status,
                "Upstream responded"
            );
            metrics::record_request(&method, status.as_u16(), &route_name, start_time);

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(error)) => {
            tracing::error!(
                request_id = %request_id,
                route = %route_name,
                error = %error,
                "Upstream request failed"
            );
            metrics::record_request(&method, 502, &route_name, start_time);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                route = %route_name,
                timeout_secs = state.request_timeout.as_secs(),
                "Upstream request timed out"
            );
            metrics::record_request(&method, 502, &route_name, start_time);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}
