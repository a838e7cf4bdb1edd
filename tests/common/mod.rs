//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Json;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use books_gateway::config::{GatewayConfig, RouteConfig};
use books_gateway::{HttpServer, Shutdown};

/// Build a route rule pointing at a test backend.
pub fn route(name: &str, prefix: &str, target_addr: SocketAddr) -> RouteConfig {
    RouteConfig {
        name: name.to_string(),
        prefix: prefix.to_string(),
        target: format!("http://{}", target_addr),
        strip_prefix: false,
    }
}

/// A test configuration with short timeouts and no metrics endpoint.
pub fn gateway_config(routes: Vec<RouteConfig>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.routes = routes;
    config.timeouts.connect_secs = 1;
    config.timeouts.request_secs = 2;
    config.observability.metrics_enabled = false;
    config
}

/// Start a gateway on an ephemeral port.
///
/// The returned [`Shutdown`] must stay alive for the duration of the test;
/// dropping it stops the server.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config).expect("test config must build");

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Start a minimal raw-TCP backend that answers every connection with a
/// fixed 200 response.
#[allow(dead_code)]
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Consume the request head before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an axum backend that echoes the request back as JSON:
/// `{"method", "path", "query", "request_id", "body"}`.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "method": method.to_string(),
            "path": uri.path(),
            "query": uri.query(),
            "request_id": headers
                .get("x-request-id")
                .and_then(|value| value.to_str().ok()),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    let app = Router::new().fallback(echo);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Start a fixed-response backend that counts the requests it serves.
#[allow(dead_code)]
pub async fn start_counting_backend(response: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    let counter = Arc::new(AtomicU32::new(0));

    async fn handle(State(state): State<(Arc<AtomicU32>, &'static str)>) -> &'static str {
        state.0.fetch_add(1, Ordering::SeqCst);
        state.1
    }

    let app = Router::new()
        .fallback(handle)
        .with_state((counter.clone(), response));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, counter)
}

/// Start an axum backend that answers every request with a fixed status
/// and body.
#[allow(dead_code)]
pub async fn start_status_backend(status: u16, body: &'static str) -> SocketAddr {
    async fn handle(State(state): State<(u16, &'static str)>) -> (axum::http::StatusCode, &'static str) {
        (
            axum::http::StatusCode::from_u16(state.0).expect("valid status in test"),
            state.1,
        )
    }

    let app = Router::new().fallback(handle).with_state((status, body));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Reserve an address that has no listener behind it.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
