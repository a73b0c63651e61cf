//! Single-origin mirroring reverse proxy.
//!
//! Forwards every request to one fixed upstream origin, presents a browser
//! identity upstream, answers CORS preflights locally and rewrites URLs in
//! HTML responses so navigation stays on the proxy.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod rewrite;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, StartupError};
pub use http::{HttpServer, WebsiteProxy};
pub use lifecycle::Shutdown;
