//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy route and static fallback
//! - Wire up middleware (tracing, request ID, preflight, CORS headers)
//! - Bind server to listener
//! - Forward the proxy route to the upstream inference service
//! - Serve everything else from the document root

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::cors::{self, with_cors_headers};
use crate::http::forward::{content_length, ProxyForwarder, RequestError};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;

/// Errors raised while constructing the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream URL: {0}")]
    InvalidUpstream(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<ProxyForwarder>,
    pub max_body_size: usize,
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let forwarder = Arc::new(ProxyForwarder::new(&config.upstream)?);

        let state = AppState {
            forwarder,
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        // Non-POST methods on the proxy path go to the same fallback as
        // unmatched paths, not to the method router's 405.
        let router = if config.static_files.enabled {
            let static_files = ServeDir::new(&config.static_files.root);
            Router::new()
                .route(
                    &config.proxy.path,
                    post(generate_handler).fallback_service(static_files.clone()),
                )
                .fallback_service(static_files)
        } else {
            Router::new()
                .route(
                    &config.proxy.path,
                    post(generate_handler).fallback(|| async { StatusCode::NOT_FOUND }),
                )
                .fallback(|| async { StatusCode::NOT_FOUND })
        };

        let router = router
            .with_state(state)
            .layer(middleware::from_fn(cors::preflight));

        with_cors_headers(router)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            proxy_path = %self.config.proxy.path,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );
        if self.config.static_files.enabled {
            tracing::info!(root = %self.config.static_files.root.display(), "Serving static files");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Proxy route handler.
/// Validates the inbound length, buffers the body and forwards it upstream.
async fn generate_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let length = match content_length(request.headers(), state.max_body_size) {
        Ok(length) => length,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected inbound request");
            return e.into_response();
        }
    };

    let body = match axum::body::to_bytes(request.into_body(), state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return RequestError::Body(e.to_string()).into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        content_length = length,
        upstream = %state.forwarder.upstream(),
        "Forwarding request"
    );

    match state.forwarder.forward(body).await {
        Ok(upstream) => {
            tracing::info!(
                request_id = %request_id,
                upstream_status = %upstream.status,
                bytes = upstream.body.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Upstream responded"
            );
            metrics::record_upstream(metrics::Outcome::Success, start_time);
            upstream.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(metrics::Outcome::Failure, start_time);
            e.into_response()
        }
    }
}
