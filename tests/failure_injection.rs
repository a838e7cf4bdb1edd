//! Failure injection tests: upstream failures must surface as prompt 502s,
//! never as hangs, crashes, or hidden retries.

mod common;

use common::{gateway_config, route, start_gateway, start_mock_backend, unused_addr};

use std::time::{Duration, Instant};

use tokio::net::TcpListener;

#[tokio::test]
async fn test_upstream_down_returns_502() {
    let dead = unused_addr().await;
    let config = gateway_config(vec![route("books", "/books", dead)]);
    let (gateway, _shutdown) = start_gateway(config).await;

    let res = reqwest::Client::new()
        .get(format!("http://{}/books/getAll", gateway))
        .send()
        .await
        .expect("gateway must answer, not hang");

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), "Bad Gateway");
}

#[tokio::test]
async fn test_unresponsive_upstream_times_out_with_502() {
    // A backend that accepts connections but never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        drop(socket);
                    });
                }
                Err(_) => break,
            }
        }
    });

    let mut config = gateway_config(vec![route("books", "/books", addr)]);
    config.timeouts.request_secs = 1;
    let (gateway, _shutdown) = start_gateway(config).await;

    let start = Instant::now();
    let res = reqwest::Client::new()
        .get(format!("http://{}/books/getAll", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert!(
        start.elapsed() < Duration::from_secs(3),
        "timeout must be bounded, took {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_gateway_survives_upstream_failure() {
    let dead = unused_addr().await;
    let live = start_mock_backend("ok").await;
    let config = gateway_config(vec![
        route("auth", "/auth", dead),
        route("books", "/books", live),
    ]);
    let (gateway, _shutdown) = start_gateway(config).await;

    let client = reqwest::Client::new();

    // The dead upstream fails this request only.
    let res = client
        .get(format!("http://{}/auth/login", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    // Other routes keep working on the same gateway.
    let res = client
        .get(format!("http://{}/books/getAll", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_failure_is_not_retried() {
    // Each request to a dead upstream is one attempt; back-to-back calls
    // must all fail promptly rather than queue behind hidden retries.
    let dead = unused_addr().await;
    let config = gateway_config(vec![route("books", "/books", dead)]);
    let (gateway, _shutdown) = start_gateway(config).await;

    let client = reqwest::Client::new();
    let start = Instant::now();
    for _ in 0..3 {
        let res = client
            .get(format!("http://{}/books/getAll", gateway))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 502);
    }
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "refused connections must fail fast, took {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_graceful_shutdown_stops_server() {
    let live = start_mock_backend("ok").await;
    let config = gateway_config(vec![route("books", "/books", live)]);
    let (gateway, shutdown) = start_gateway(config).await;

    let res = reqwest::get(format!("http://{}/books/getAll", gateway))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // A fresh connection must be refused once the listener is closed.
    let result = reqwest::Client::new()
        .get(format!("http://{}/books/getAll", gateway))
        .send()
        .await;
    assert!(result.is_err(), "listener should be closed after shutdown");
}
