//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → proxy.rs (CORS preflight short-circuit)
//!     → request.rs (proxy's own scheme + host)
//!     → [upstream forwarder sends the request]
//!     → response.rs (filter headers, CORS, HTML rewrite)
//!     → Send to client
//! ```

pub mod cors;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::WebsiteProxy;
pub use request::{MakeRequestUuid, OriginResolver, ProxyOrigin, X_REQUEST_ID};
pub use server::HttpServer;
