//! Cross-origin headers and preflight handling.
//!
//! # Responsibilities
//! - Stamp the permissive CORS headers on every response
//! - Answer OPTIONS preflights for any path without routing
//!
//! # Design Decisions
//! - Headers are applied once, as the outermost response layer, so no
//!   handler (proxy, static files, 404/405, errors) can skip them
//! - Headers are unconditional: they are sent whether or not the request
//!   carried an `Origin`, unlike `tower_http::cors::CorsLayer`

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers attached to every response.
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

/// Wrap `router` so every response it produces carries [`CORS_HEADERS`].
///
/// Must be the last layer added that can produce a response.
pub fn with_cors_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    CORS_HEADERS.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::overriding(
            name,
            HeaderValue::from_static(value),
        ))
    })
}

/// Short-circuit OPTIONS requests with an empty 200.
pub async fn preflight(request: Request<Body>, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        tracing::debug!(path = %request.uri().path(), "Answering preflight");
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}
