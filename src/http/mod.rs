//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → cors.rs (OPTIONS answered here; CORS headers stamped on the way out)
//!     → POST <proxy path>: forward.rs → upstream inference service
//!     → anything else: static files from the document root
//!     → Send to client
//! ```

pub mod cors;
pub mod forward;
pub mod server;

pub use forward::{ErrorPayload, ProxyForwarder, UpstreamError, UpstreamResponse};
pub use server::{HttpServer, ServerError};
