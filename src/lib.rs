//! Local CORS proxy for a generative-model inference service.
//!
//! Serves a document root and forwards one POST route to a fixed upstream,
//! adding permissive cross-origin headers to every response.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
