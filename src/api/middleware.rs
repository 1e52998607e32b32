//! Ambient HTTP middleware: request-ID propagation, request logging, CORS
//! and security headers. Authentication and rate limiting are explicit
//! Non-goals (§1) and are not carried here; request-ID propagation and
//! request logging are observability, not access control, so they're
//! kept per §10, grounded on the teacher's `request_id_middleware` /
//! `request_logging_middleware` (`api/middleware.rs`).

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Request ID header name.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Attach a request ID (propagated from the caller if present, else
/// freshly generated) to every request's extensions and every response's
/// headers.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Log each request's method/URI/status/duration at `info` level,
/// keyed by the request ID attached by [`request_id_middleware`].
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<String>()
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(request_id = %request_id, method = %method, uri = %uri, "incoming request");

    let response = next.run(request).await;

    let duration = start.elapsed();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = %duration.as_millis(),
        "request completed"
    );

    response
}

/// Add the baseline security headers the teacher's
/// `security_headers_middleware` applies to every response.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));

    response
}

/// Permissive CORS layer — the Scheduler and monitors calling this
/// service are internal cluster peers, not browser clients, but the
/// teacher's services all carry one for uniform tooling access.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderValue::from_static("x-request-id")])
        .expose_headers([HeaderValue::from_static("x-request-id")])
        .max_age(Duration::from_secs(3600))
}
