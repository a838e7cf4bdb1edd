//! Request identity.
//!
//! # Responsibilities
//! - Ensure every request carries an `x-request-id` header
//! - Expose the ID to handlers via request extensions
//!
//! # Design Decisions
//! - IDs supplied by the caller are preserved so clients can correlate
//! - Generated IDs are UUID v4
//! - Applied as early as possible so logs and the upstream share the ID

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request extension holding the request ID.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Extension trait for reading the request ID off a request.
pub trait RequestIdExt {
    /// The request ID attached by [`RequestIdLayer`], if any.
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.extensions().get::<RequestId>().map(|id| id.0.as_str())
    }
}

/// Layer that attaches a request ID to every request.
#[derive(Debug, Clone, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let id = match req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
        {
            Some(existing) => existing.to_string(),
            None => {
                let generated = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&generated) {
                    req.headers_mut().insert(X_REQUEST_ID, value);
                }
                generated
            }
        };
        req.extensions_mut().insert(RequestId(id));

        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn capture(req: Request<Body>) -> Result<(String, Option<String>), Infallible> {
        let header = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok((req.request_id().unwrap_or("missing").to_string(), header))
    }

    #[tokio::test]
    async fn test_generates_id_when_missing() {
        let service = RequestIdLayer.layer(service_fn(capture));
        let req = Request::builder().uri("/books").body(Body::empty()).unwrap();

        let (extension_id, header_id) = service.oneshot(req).await.unwrap();
        assert_eq!(Some(extension_id), header_id);
    }

    #[tokio::test]
    async fn test_preserves_caller_id() {
        let service = RequestIdLayer.layer(service_fn(capture));
        let req = Request::builder()
            .uri("/books")
            .header(X_REQUEST_ID, "caller-supplied")
            .body(Body::empty())
            .unwrap();

        let (extension_id, header_id) = service.oneshot(req).await.unwrap();
        assert_eq!(extension_id, "caller-supplied");
        assert_eq!(header_id.as_deref(), Some("caller-supplied"));
    }
}
